//! HTTP API.
//!
//! Thin shell over `pipeline`: document uploads go through the extraction
//! pipeline, deal requests through the decision engine. Routes are nested
//! under `/api/v1/` and protected by bearer-token auth and audit logging.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, serve_on};
pub use types::{ApiContext, Principal, TokenRegistry};
