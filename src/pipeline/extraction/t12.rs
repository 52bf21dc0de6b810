use super::matching::{
    first_currency_amount, line_rule_for, matching_rules, Coerced, T12_COLUMN_RULES,
};
use super::types::T12Record;
use super::ExtractionError;
use crate::pipeline::decode::Row;

/// Minimum readable characters a text document must carry.
const MIN_READABLE_CHARS: usize = 10;
/// Lines shorter than this are treated as layout noise.
const MIN_LINE_LEN: usize = 3;
/// Tolerance for the NOI ≈ income − expenses cross-check.
const NOI_TOLERANCE: f64 = 1000.0;

/// Decoded T12 input: full document text, or table rows.
#[derive(Debug, Clone, Copy)]
pub enum T12Input<'a> {
    Text(&'a str),
    Rows(&'a [Row]),
}

/// Extract the canonical T12 record.
///
/// The text path keyword-scans lines and keeps only in-bounds amounts. The
/// row path matches column names and coerces unparseable cells to 0. Only
/// the text path can fail, and only for unreadable text.
pub fn extract_t12(input: T12Input<'_>) -> Result<T12Record, ExtractionError> {
    match input {
        T12Input::Text(text) => extract_from_text(text),
        T12Input::Rows(rows) => Ok(extract_from_rows(rows)),
    }
}

fn extract_from_text(text: &str) -> Result<T12Record, ExtractionError> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '\0' && *c != '\u{FFFD}')
        .collect();
    if cleaned.len() != text.len() {
        tracing::warn!("Document text contained null or replacement characters; cleaned");
    }
    if cleaned.is_empty() {
        return Err(ExtractionError::ParseFailed(
            "document content is entirely corrupted or binary".into(),
        ));
    }

    let readable = cleaned.chars().filter(|c| is_readable(*c)).count();
    if readable < MIN_READABLE_CHARS {
        return Err(ExtractionError::ParseFailed(
            "document does not contain sufficient readable text".into(),
        ));
    }

    let mut record = T12Record::default();
    let mut matched = 0usize;

    for line in cleaned.lines().map(str::trim) {
        if line.chars().count() < MIN_LINE_LEN || !line.chars().any(|c| c.is_ascii_alphabetic()) {
            continue;
        }

        let lower = line.to_lowercase();
        let Some(rule) = line_rule_for(&lower) else {
            continue;
        };
        let Some(value) = first_currency_amount(line) else {
            continue;
        };

        if rule.accepts(value) {
            record.assign(rule.field, Coerced::Number(value));
            matched += 1;
        } else {
            tracing::debug!(field = ?rule.field, value, "Amount outside plausible bounds; ignored");
        }
    }

    if matched == 0 {
        tracing::warn!("No T12 financial data patterns found in document text");
    }
    cross_check(&record);

    Ok(record)
}

fn extract_from_rows(rows: &[Row]) -> T12Record {
    let mut record = T12Record::default();

    for row in rows {
        for (key, cell) in row {
            for rule in matching_rules(T12_COLUMN_RULES, key) {
                record.assign(rule.field, rule.coerce.apply(cell));
            }
        }
    }

    if record.is_empty() {
        tracing::warn!(rows = rows.len(), "No T12 columns recognized in table");
    }
    record.raw_row_data = Some(rows.to_vec());
    record
}

/// Readable: ASCII word characters, whitespace and common currency punctuation.
fn is_readable(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || matches!(c, '$' | '.' | ',' | '-' | '(' | ')')
}

fn cross_check(record: &T12Record) {
    if let (Some(income), Some(expenses)) = (record.total_income, record.total_expenses) {
        if income < expenses {
            tracing::warn!(income, expenses, "Total expenses exceed total income; verify source data");
        }
    }

    if let (Some(income), Some(noi)) = (record.total_income, record.net_operating_income) {
        let expected = income - record.total_expenses.unwrap_or(0.0);
        if (noi - expected).abs() > NOI_TOLERANCE {
            tracing::warn!(noi, expected, "NOI inconsistent with income minus expenses");
        }
    }
}
