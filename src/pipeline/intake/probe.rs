use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use serde::{Deserialize, Serialize};

use super::format::FileKind;
use crate::pipeline::decode::spreadsheet::rows_from_range;
use crate::pipeline::decode::{PdfExtractor, PdfTextExtractor};

const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_EOF_MARKER: &[u8] = b"%%EOF";
/// Bytes at the end of a PDF searched for the EOF marker.
const PDF_TAIL_LEN: usize = 10;
/// Data lines (after the header) sampled for the column-count check.
const CSV_SAMPLE_LINES: usize = 10;

/// Outcome of structurally checking an upload before extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorruptionVerdict {
    pub is_corrupted: bool,
    pub error: Option<String>,
    pub file_type: String,
}

impl CorruptionVerdict {
    fn intact(file_type: &str) -> Self {
        Self {
            is_corrupted: false,
            error: None,
            file_type: file_type.to_string(),
        }
    }

    fn corrupted(error: impl Into<String>, file_type: &str) -> Self {
        Self {
            is_corrupted: true,
            error: Some(error.into()),
            file_type: file_type.to_string(),
        }
    }

    /// Human-readable cause, or a generic note when none was recorded.
    pub fn cause(&self) -> &str {
        self.error.as_deref().unwrap_or("File failed structural validation")
    }
}

/// Check whether the file at `path` can be parsed as its declared extension.
///
/// Never panics and never returns an error: every failure, including a panic
/// inside a format library, becomes a corrupted verdict.
pub fn probe(path: &Path, declared_extension: &str) -> CorruptionVerdict {
    let ext = declared_extension.trim_start_matches('.').to_ascii_lowercase();

    let verdict = panic::catch_unwind(AssertUnwindSafe(|| probe_inner(path, &ext)))
        .unwrap_or_else(|payload| {
            CorruptionVerdict::corrupted(
                format!("Unexpected error: {}", panic_message(payload.as_ref())),
                "unknown",
            )
        });

    if verdict.is_corrupted {
        tracing::warn!(
            file_type = %verdict.file_type,
            cause = verdict.cause(),
            "Upload failed corruption probe"
        );
    }
    verdict
}

fn probe_inner(path: &Path, ext: &str) -> CorruptionVerdict {
    if !path.exists() {
        return CorruptionVerdict::corrupted("File does not exist", "unknown");
    }

    let kind = FileKind::from_extension(ext);
    let file_type = kind.map_or(ext, |k| k.file_type());

    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => return CorruptionVerdict::corrupted(format!("Unexpected error: {e}"), "unknown"),
    };
    if size == 0 {
        return CorruptionVerdict::corrupted("File is empty", file_type);
    }

    let Some(kind) = kind else {
        return CorruptionVerdict {
            is_corrupted: false,
            error: Some("Unsupported file type".into()),
            file_type: file_type.to_string(),
        };
    };

    match kind {
        FileKind::Spreadsheet => probe_spreadsheet(path),
        FileKind::Delimited => with_contents(path, probe_delimited),
        FileKind::Pdf => with_contents(path, probe_pdf),
    }
}

fn with_contents(path: &Path, check: fn(&[u8]) -> CorruptionVerdict) -> CorruptionVerdict {
    match std::fs::read(path) {
        Ok(bytes) => check(&bytes),
        Err(e) => CorruptionVerdict::corrupted(format!("Unexpected error: {e}"), "unknown"),
    }
}

fn probe_delimited(bytes: &[u8]) -> CorruptionVerdict {
    let file_type = FileKind::Delimited.file_type();

    if bytes.contains(&0) {
        return CorruptionVerdict::corrupted("File contains null bytes", file_type);
    }

    let content = String::from_utf8_lossy(bytes);
    if content.trim().is_empty() {
        return CorruptionVerdict::corrupted(
            "File appears to be empty or contains only whitespace",
            file_type,
        );
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut widths: Vec<usize> = Vec::new();
    for record in reader.records() {
        match record {
            Ok(r) if r.iter().all(|f| f.trim().is_empty()) => continue,
            Ok(r) => widths.push(r.len()),
            Err(e) => return CorruptionVerdict::corrupted(format!("CSV parsing error: {e}"), file_type),
        }
    }

    let Some((&header_width, data)) = widths.split_first() else {
        return CorruptionVerdict::corrupted("No valid lines found in CSV", file_type);
    };

    let sample = &data[..data.len().min(CSV_SAMPLE_LINES)];
    let inconsistent = sample.iter().filter(|&&w| w != header_width).count();
    if inconsistent * 2 > sample.len() {
        return CorruptionVerdict::corrupted("Inconsistent column count detected", file_type);
    }

    CorruptionVerdict::intact(file_type)
}

fn probe_pdf(bytes: &[u8]) -> CorruptionVerdict {
    let file_type = FileKind::Pdf.file_type();

    if !bytes.starts_with(PDF_MAGIC) {
        return CorruptionVerdict::corrupted("Invalid PDF header", file_type);
    }

    let tail = &bytes[bytes.len().saturating_sub(PDF_TAIL_LEN)..];
    if !tail.windows(PDF_EOF_MARKER.len()).any(|w| w == PDF_EOF_MARKER) {
        return CorruptionVerdict::corrupted("Missing PDF EOF marker", file_type);
    }

    let extractor = PdfTextExtractor;
    let decoded = extractor
        .page_count(bytes)
        .and_then(|count| extractor.page_texts(bytes).map(|_| count));

    match decoded {
        Ok(_) => CorruptionVerdict::intact(file_type),
        Err(e) => CorruptionVerdict::corrupted(format!("PDF parsing error: {e}"), file_type),
    }
}

fn probe_spreadsheet(path: &Path) -> CorruptionVerdict {
    let file_type = FileKind::Spreadsheet.file_type();

    let mut workbook = match open_workbook_auto(path) {
        Ok(wb) => wb,
        Err(e) => return CorruptionVerdict::corrupted(format!("Excel parsing error: {e}"), file_type),
    };

    let names = workbook.sheet_names();
    first_sheet_verdict(&names, |name| workbook.worksheet_range(name))
}

/// Judge a workbook by its sheet list and the conversion of its first sheet.
fn first_sheet_verdict<E: std::fmt::Display>(
    sheet_names: &[String],
    read_sheet: impl FnOnce(&str) -> Result<Range<Data>, E>,
) -> CorruptionVerdict {
    let file_type = FileKind::Spreadsheet.file_type();

    let Some(first) = sheet_names.first() else {
        return CorruptionVerdict::corrupted("No sheets found in Excel file", file_type);
    };

    match read_sheet(first) {
        Ok(range) => {
            let rows = rows_from_range(&range);
            tracing::debug!(sheet = %first, rows = rows.len(), "Worksheet readable");
            CorruptionVerdict::intact(file_type)
        }
        Err(e) => {
            tracing::debug!(sheet = %first, error = %e, "Worksheet unreadable");
            CorruptionVerdict::corrupted("Cannot access worksheet data", file_type)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "decoder panicked".to_string()
    }
}
