use std::path::Path;

use serde::Serialize;

use crate::pipeline::decode::RowFormat;

/// Document format, decided by the declared file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Spreadsheet,
    Delimited,
}

impl FileKind {
    /// Map a declared extension (with or without the leading dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            "csv" => Some(Self::Delimited),
            _ => None,
        }
    }

    /// Label reported to callers in verdicts and error bodies.
    pub fn file_type(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Spreadsheet => "excel",
            Self::Delimited => "csv",
        }
    }

    /// Row decoder for table formats; `None` for page-based documents.
    pub fn row_format(&self) -> Option<RowFormat> {
        match self {
            Self::Pdf => None,
            Self::Spreadsheet => Some(RowFormat::Spreadsheet),
            Self::Delimited => Some(RowFormat::Delimited),
        }
    }
}

/// Lower-cased extension of a filename, without the dot. Empty when absent.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Longest sanitized filename, in characters.
const MAX_FILENAME_CHARS: usize = 255;

/// Reduce a client-supplied filename to its final component, without path
/// separators or NULs, capped at 255 characters. Over-long names lose
/// characters from the stem, never from the extension.
pub fn sanitize_filename(original: &str) -> String {
    let last = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let clean: String = last
        .chars()
        .filter(|c| *c != '\0' && !c.is_control())
        .collect();
    let clean = truncate_stem(clean.trim());
    let clean = clean.trim();
    if clean.is_empty() || clean == "." || clean == ".." {
        "upload".to_string()
    } else {
        clean.to_string()
    }
}

fn truncate_stem(name: &str) -> String {
    if name.chars().count() <= MAX_FILENAME_CHARS {
        return name.to_string();
    }
    let extension = extension_of(name);
    if extension.is_empty() || extension.len() >= MAX_FILENAME_CHARS {
        return name.chars().take(MAX_FILENAME_CHARS).collect();
    }
    // The suffix keeps its original case.
    let suffix_start = name.len() - extension.len() - 1;
    let suffix = &name[suffix_start..];
    let stem: String = name[..suffix_start]
        .chars()
        .take(MAX_FILENAME_CHARS - suffix.chars().count())
        .collect();
    format!("{stem}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_from_extension() {
        assert_eq!(FileKind::from_extension("pdf"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_extension(".XLSX"), Some(FileKind::Spreadsheet));
        assert_eq!(FileKind::from_extension("xls"), Some(FileKind::Spreadsheet));
        assert_eq!(FileKind::from_extension("Csv"), Some(FileKind::Delimited));
        assert_eq!(FileKind::from_extension("docx"), None);
        assert_eq!(FileKind::from_extension(""), None);
    }

    #[test]
    fn file_type_labels() {
        assert_eq!(FileKind::Pdf.file_type(), "pdf");
        assert_eq!(FileKind::Spreadsheet.file_type(), "excel");
        assert_eq!(FileKind::Delimited.file_type(), "csv");
    }

    #[test]
    fn row_format_only_for_tables() {
        assert_eq!(FileKind::Pdf.row_format(), None);
        assert_eq!(FileKind::Delimited.row_format(), Some(RowFormat::Delimited));
        assert_eq!(FileKind::Spreadsheet.row_format(), Some(RowFormat::Spreadsheet));
    }

    #[test]
    fn extension_lowercased() {
        assert_eq!(extension_of("T12 Statement.PDF"), "pdf");
        assert_eq!(extension_of("rent.roll.xlsx"), "xlsx");
        assert_eq!(extension_of("README"), "");
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\rent.csv"), "rent.csv");
        assert_eq!(sanitize_filename("t12\0.pdf"), "t12.pdf");
    }

    #[test]
    fn sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("dir/"), "upload");
        assert_eq!(sanitize_filename(".."), "upload");
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "a".repeat(400) + ".csv";
        assert_eq!(sanitize_filename(&long).chars().count(), 255);
    }

    #[test]
    fn over_long_names_keep_their_extension() {
        let name = sanitize_filename(&("a".repeat(260) + ".csv"));
        assert_eq!(name.chars().count(), 255);
        assert!(name.ends_with(".csv"));
        assert_eq!(extension_of(&name), "csv");

        let name = sanitize_filename(&("é".repeat(300) + ".XLSX"));
        assert_eq!(name.chars().count(), 255);
        assert!(name.ends_with(".XLSX"));
    }

    #[test]
    fn over_long_name_without_extension_is_cut() {
        let name = sanitize_filename(&"b".repeat(300));
        assert_eq!(name, "b".repeat(255));
    }
}
