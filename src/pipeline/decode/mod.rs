pub mod delimited;
pub mod pdf;
pub mod spreadsheet;

pub use pdf::{read_text, PdfExtractor, PdfTextExtractor};

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name given to columns whose header cell is blank.
const BLANK_HEADER: &str = "__EMPTY";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Workbook contains no worksheets")]
    NoWorksheet,

    #[error("PDF parsing failed: {0}")]
    Pdf(String),
}

/// A single cell as it appeared in the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Interpret a raw delimited-table field. Blank fields yield `None`;
    /// fields that are entirely a decimal number become `Number`.
    pub fn from_field(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if looks_numeric(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return Some(Self::Number(n));
                }
            }
        }
        Some(Self::Text(trimmed.to_string()))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn looks_numeric(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && s.chars().any(|c| c.is_ascii_digit())
}

/// One source row: original column header (case preserved) → cell value.
/// Column order follows the source.
pub type Row = IndexMap<String, CellValue>;

/// Table formats that decode to rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFormat {
    Delimited,
    Spreadsheet,
}

/// Decode a row-oriented file with the decoder for `format`.
pub fn read_rows(path: &Path, format: RowFormat) -> Result<Vec<Row>, DecodeError> {
    match format {
        RowFormat::Delimited => delimited::read_rows(path),
        RowFormat::Spreadsheet => spreadsheet::read_rows(path),
    }
}

/// Turn raw header cells into unique column names.
///
/// Blank headers become `__EMPTY`, `__EMPTY_1`, … and repeated headers get
/// `_1`, `_2`, … suffixes, so no column is shadowed by another.
pub(crate) fn header_names<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names: Vec<String> = Vec::new();

    for cell in raw {
        let trimmed = cell.trim().trim_start_matches('\u{feff}').trim();
        let base = if trimmed.is_empty() {
            BLANK_HEADER.to_string()
        } else {
            trimmed.to_string()
        };

        let name = match seen.get(&base).copied() {
            None => base.clone(),
            Some(mut n) => loop {
                n += 1;
                let candidate = format!("{base}_{n}");
                if !names.contains(&candidate) {
                    seen.insert(base.clone(), n);
                    break candidate;
                }
            },
        };
        seen.entry(base).or_insert(0);
        names.push(name);
    }

    names
}

/// Build a row from positional cells. Blank cells are left out of the
/// mapping; a row with no non-blank cell yields `None`.
pub(crate) fn build_row<I>(headers: &[String], cells: I) -> Option<Row>
where
    I: IntoIterator<Item = Option<CellValue>>,
{
    let row: Row = headers
        .iter()
        .zip(cells)
        .filter_map(|(header, cell)| {
            cell.filter(|c| !c.is_blank())
                .map(|c| (header.clone(), c))
        })
        .collect();

    if row.is_empty() {
        None
    } else {
        Some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_numbers_become_numbers() {
        assert_eq!(CellValue::from_field("470000"), Some(CellValue::Number(470000.0)));
        assert_eq!(CellValue::from_field(" 12.5 "), Some(CellValue::Number(12.5)));
        assert_eq!(CellValue::from_field("-3"), Some(CellValue::Number(-3.0)));
    }

    #[test]
    fn field_text_stays_text() {
        assert_eq!(
            CellValue::from_field("$1,200"),
            Some(CellValue::Text("$1,200".into()))
        );
        assert_eq!(CellValue::from_field("inf"), Some(CellValue::Text("inf".into())));
        assert_eq!(CellValue::from_field("Occupied"), Some(CellValue::Text("Occupied".into())));
    }

    #[test]
    fn blank_field_is_none() {
        assert_eq!(CellValue::from_field(""), None);
        assert_eq!(CellValue::from_field("   "), None);
    }

    #[test]
    fn display_matches_source_text() {
        assert_eq!(CellValue::Number(1190000.0).to_string(), "1190000");
        assert_eq!(CellValue::Number(1162.5).to_string(), "1162.5");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
        assert_eq!(CellValue::Text("Unit 4".into()).to_string(), "Unit 4");
    }

    #[test]
    fn header_names_fill_blanks_and_dedupe() {
        let names = header_names(
            ["Unit", "", "Rent", "Rent", "", "Rent"]
                .iter()
                .map(|s| s.to_string()),
        );
        assert_eq!(
            names,
            vec!["Unit", "__EMPTY", "Rent", "Rent_1", "__EMPTY_1", "Rent_2"]
        );
    }

    #[test]
    fn header_names_strip_bom() {
        let names = header_names(vec!["\u{feff}Unit Number".to_string()]);
        assert_eq!(names, vec!["Unit Number"]);
    }

    #[test]
    fn build_row_skips_blank_cells() {
        let headers = vec!["Unit".to_string(), "Tenant Name".to_string(), "Rent".to_string()];
        let row = build_row(
            &headers,
            vec![
                Some(CellValue::Text("101".into())),
                Some(CellValue::Text("  ".into())),
                Some(CellValue::Number(1200.0)),
            ],
        )
        .unwrap();
        assert_eq!(row.len(), 2);
        assert!(!row.contains_key("Tenant Name"));
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Unit", "Rent"]);
    }

    #[test]
    fn build_row_all_blank_is_none() {
        let headers = vec!["A".to_string(), "B".to_string()];
        assert!(build_row(&headers, vec![None, None]).is_none());
    }

    #[test]
    fn cell_value_serializes_untagged() {
        let mut row = Row::new();
        row.insert("Unit".into(), CellValue::Text("A1".into()));
        row.insert("Rent".into(), CellValue::Number(950.0));
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"Unit":"A1","Rent":950.0}"#);
    }
}
