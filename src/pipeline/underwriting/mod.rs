pub mod engine;
pub mod gemini;
pub mod parser;
pub mod prompt;
pub mod property;
pub mod types;

pub use engine::*;
pub use gemini::*;
pub use parser::*;
pub use prompt::*;
pub use property::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnderwritingError {
    #[error("Missing parameters in body: {0}")]
    MissingInput(&'static str),

    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Decision engine is not reachable at {0}")]
    EngineConnection(String),

    #[error("Decision engine returned error (status {status}): {body}")]
    EngineError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Decision engine returned no content")]
    EmptyResponse,

    #[error("Malformed decision: {0}")]
    MalformedDecision(String),
}
