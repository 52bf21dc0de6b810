pub mod format;
pub mod probe;
pub mod upload;

pub use format::*;
pub use probe::*;
pub use upload::*;

use thiserror::Error;

use crate::pipeline::decode::DecodeError;
use crate::pipeline::extraction::ExtractionError;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format for {document}. Please use {accepted} files.")]
    UnsupportedFormat {
        document: &'static str,
        accepted: &'static str,
    },

    #[error("File is corrupted: {}", .0.cause())]
    Corrupted(CorruptionVerdict),

    #[error("Could not decode {file_type} file: {source}")]
    Decode {
        file_type: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
