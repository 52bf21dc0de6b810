pub mod matching;
pub mod rent_roll;
pub mod t12;
pub mod types;

pub use rent_roll::*;
pub use t12::*;
pub use types::*;

use thiserror::Error;

/// Decoder messages that indicate a structurally broken document.
const CORRUPTION_MARKERS: &[&str] = &[
    "xref",
    "formaterror",
    "invalid pdf",
    "invalid file header",
    "pdf parsing failed",
    "trailer",
];
const ENCRYPTION_MARKERS: &[&str] = &["password", "encrypt"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Document appears to be corrupted or invalid. Please try uploading a different version of the file. Details: {0}")]
    CorruptedDocument(String),

    #[error("Document is password protected or encrypted. Please provide an unprotected version.")]
    EncryptedDocument,

    #[error("Failed to parse document: {0}. Please ensure the file is a valid document containing financial data.")]
    ParseFailed(String),
}

impl ExtractionError {
    /// Classify a raw decoder error message.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if CORRUPTION_MARKERS.iter().any(|m| lower.contains(m)) {
            Self::CorruptedDocument(message.to_string())
        } else if ENCRYPTION_MARKERS.iter().any(|m| lower.contains(m)) {
            Self::EncryptedDocument
        } else {
            Self::ParseFailed(message.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_corruption() {
        assert!(matches!(
            ExtractionError::classify("bad XRef entry at offset 10"),
            ExtractionError::CorruptedDocument(_)
        ));
        assert!(matches!(
            ExtractionError::classify("PDF parsing failed: Invalid file header"),
            ExtractionError::CorruptedDocument(_)
        ));
        assert!(matches!(
            ExtractionError::classify("Trailer not found"),
            ExtractionError::CorruptedDocument(_)
        ));
    }

    #[test]
    fn classify_encryption() {
        assert_eq!(
            ExtractionError::classify("document is encrypted"),
            ExtractionError::EncryptedDocument
        );
        assert_eq!(
            ExtractionError::classify("Password required"),
            ExtractionError::EncryptedDocument
        );
    }

    #[test]
    fn classify_other() {
        assert_eq!(
            ExtractionError::classify("unexpected font encoding"),
            ExtractionError::ParseFailed("unexpected font encoding".into())
        );
    }

    #[test]
    fn messages_are_actionable() {
        let msg = ExtractionError::EncryptedDocument.to_string();
        assert!(msg.contains("unprotected version"));
    }
}
