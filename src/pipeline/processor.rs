//! Per-document orchestration: probe → decode → extract.
//!
//! Runs synchronously; the HTTP layer calls it from a blocking task and owns
//! the `RawUpload`, so the temporary file outlives every step here.

use std::time::Instant;

use crate::pipeline::decode::{self, DecodeError};
use crate::pipeline::extraction::{
    extract_rent_roll, extract_t12, ExtractionError, RentRollRecord, T12Input, T12Record,
};
use crate::pipeline::intake::{probe, FileKind, IntakeError, RawUpload};

/// Which canonical record an upload is meant to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    T12,
    RentRoll,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::T12 => "T12",
            Self::RentRoll => "Rent Roll",
        }
    }

    fn accepted_label(&self) -> &'static str {
        match self {
            Self::T12 => "PDF or Excel",
            Self::RentRoll => "CSV or Excel",
        }
    }

    pub fn accepts(&self, kind: FileKind) -> bool {
        match self {
            Self::T12 => matches!(kind, FileKind::Pdf | FileKind::Spreadsheet),
            Self::RentRoll => matches!(kind, FileKind::Delimited | FileKind::Spreadsheet),
        }
    }

    /// File kind of `upload` if this document accepts it.
    fn admit(&self, upload: &RawUpload) -> Result<FileKind, IntakeError> {
        upload
            .kind()
            .filter(|kind| self.accepts(*kind))
            .ok_or(IntakeError::UnsupportedFormat {
                document: self.label(),
                accepted: self.accepted_label(),
            })
    }
}

/// Produce the canonical T12 record from an uploaded PDF or workbook.
pub fn process_t12(upload: &RawUpload) -> Result<T12Record, IntakeError> {
    let start = Instant::now();
    let kind = DocumentKind::T12.admit(upload)?;
    ensure_intact(upload)?;

    let record = match kind.row_format() {
        None => {
            let text = decode::read_text(upload.path()).map_err(classify_pdf_error)?;
            extract_t12(T12Input::Text(&text))?
        }
        Some(format) => {
            let rows = decode::read_rows(upload.path(), format).map_err(|source| {
                IntakeError::Decode {
                    file_type: kind.file_type(),
                    source,
                }
            })?;
            extract_t12(T12Input::Rows(&rows))?
        }
    };

    tracing::info!(
        file_type = kind.file_type(),
        empty = record.is_empty(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "T12 processed"
    );
    Ok(record)
}

/// Produce the canonical rent roll from an uploaded CSV or workbook.
pub fn process_rent_roll(upload: &RawUpload) -> Result<RentRollRecord, IntakeError> {
    let start = Instant::now();
    let kind = DocumentKind::RentRoll.admit(upload)?;
    ensure_intact(upload)?;

    let format = kind.row_format().ok_or(IntakeError::UnsupportedFormat {
        document: DocumentKind::RentRoll.label(),
        accepted: DocumentKind::RentRoll.accepted_label(),
    })?;
    let rows = decode::read_rows(upload.path(), format).map_err(|source| IntakeError::Decode {
        file_type: kind.file_type(),
        source,
    })?;
    let record = extract_rent_roll(&rows);

    tracing::info!(
        file_type = kind.file_type(),
        units = record.total_units,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Rent roll processed"
    );
    Ok(record)
}

fn ensure_intact(upload: &RawUpload) -> Result<(), IntakeError> {
    let verdict = probe(upload.path(), upload.extension());
    if verdict.is_corrupted {
        Err(IntakeError::Corrupted(verdict))
    } else {
        Ok(())
    }
}

fn classify_pdf_error(err: DecodeError) -> IntakeError {
    match err {
        DecodeError::Io(e) => IntakeError::Io(e),
        DecodeError::Pdf(message) => ExtractionError::classify(&message).into(),
        other => ExtractionError::classify(&other.to_string()).into(),
    }
}
