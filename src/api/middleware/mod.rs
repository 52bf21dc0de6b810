//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator: bearer token → `Principal`
//! 2. Audit logger: runs after auth, has the principal

pub mod audit;
pub mod auth;
