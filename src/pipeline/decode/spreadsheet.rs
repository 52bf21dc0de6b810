use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use super::{build_row, header_names, CellValue, DecodeError, Row};

/// Decode the first worksheet of an Excel workbook into rows keyed by the
/// worksheet's first row.
pub fn read_rows(path: &Path) -> Result<Vec<Row>, DecodeError> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DecodeError::NoWorksheet)?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let rows = rows_from_range(&range);

    tracing::debug!(sheet = %sheet_name, rows = rows.len(), "Worksheet decoded");
    Ok(rows)
}

pub(crate) fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Vec::new();
    };

    let headers = header_names(header.iter().map(|cell| match cell_value(cell) {
        Some(value) => value.to_string(),
        None => String::new(),
    }));

    sheet_rows
        .filter_map(|cells| build_row(&headers, cells.iter().map(cell_value)))
        .collect()
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| CellValue::Text(trimmed.to_string()))
        }
        // Serial date numbers, as the workbook stores them.
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::Error(_) | Data::Empty => None,
    }
}
