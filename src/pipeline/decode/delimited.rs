use std::io::Read;
use std::path::Path;

use super::{build_row, header_names, CellValue, DecodeError, Row};

/// Decode a comma-separated file into rows keyed by the first line's headers.
pub fn read_rows(path: &Path) -> Result<Vec<Row>, DecodeError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    rows_from_reader(reader)
}

/// Decode delimited content already held in memory.
pub fn rows_from_bytes(bytes: &[u8]) -> Result<Vec<Row>, DecodeError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    rows_from_reader(reader)
}

fn rows_from_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<Row>, DecodeError> {
    // Byte records with lossy fields accept the same legacy-encoded exports
    // (Windows-1252, Latin-1) the corruption prober lets through.
    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let fields: Vec<String> = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        if fields.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        records.push(fields);
    }

    let mut records = records.into_iter();
    let Some(header) = records.next() else {
        return Ok(Vec::new());
    };

    let rest: Vec<Vec<String>> = records.collect();
    let width = rest
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    // Short header lines still name every column a data row can reach.
    let raw_headers = (0..width).map(|i| header.get(i).cloned().unwrap_or_default());
    let headers = header_names(raw_headers);

    let rows: Vec<Row> = rest
        .iter()
        .filter_map(|record| {
            build_row(&headers, record.iter().map(|field| CellValue::from_field(field)))
        })
        .collect();

    tracing::debug!(columns = headers.len(), rows = rows.len(), "Delimited table decoded");
    Ok(rows)
}
