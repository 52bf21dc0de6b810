//! Field-matching tables shared by the extractors.
//!
//! Source documents name their columns and lines loosely ("Total Operating
//! Expenses", "Gross Income (Annual)", "NOI"). Each table below is an ordered
//! list of `(predicate over lower-cased name, target field, coercion)`
//! entries; extractors evaluate them in order against every column key or
//! text line.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::decode::CellValue;

/// Canonical T12 fields reachable from source columns or text lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum T12Field {
    TotalIncome,
    TotalExpenses,
    NetOperatingIncome,
    Units,
    OccupancyRate,
}

/// Per-unit rent roll fields reachable from source columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentRollField {
    UnitNumber,
    TenantName,
    RentAmount,
    LeaseStart,
    LeaseEnd,
    Status,
}

/// How a matched cell becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerce {
    /// Leading decimal number; anything unparseable becomes 0.
    Number,
    /// Leading integer; anything unparseable becomes 0.
    Count,
    /// The cell's text as it appeared in the source.
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Number(f64),
    Count(i64),
    Text(String),
}

impl Coerce {
    pub fn apply(self, cell: &CellValue) -> Coerced {
        match self {
            Self::Number => Coerced::Number(coerce_number(cell)),
            Self::Count => Coerced::Count(coerce_count(cell)),
            Self::Text => Coerced::Text(cell.to_string()),
        }
    }
}

/// A column-name rule.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule<F> {
    pub field: F,
    pub matches: fn(&str) -> bool,
    pub coerce: Coerce,
}

/// A text-line rule: keyword family plus the open interval a value must fall in.
#[derive(Debug, Clone, Copy)]
pub struct LineRule {
    pub field: T12Field,
    pub matches: fn(&str) -> bool,
    pub bounds: (f64, f64),
}

impl LineRule {
    pub fn accepts(&self, value: f64) -> bool {
        value.is_finite() && value > self.bounds.0 && value < self.bounds.1
    }
}

// ═══════════════════════════════════════════════════════════
// Predicates (arguments are already lower-cased)
// ═══════════════════════════════════════════════════════════

fn is_income(name: &str) -> bool {
    name.contains("total income") || name.contains("gross income")
}

fn is_expenses(name: &str) -> bool {
    name.contains("total expense") || name.contains("operating expense")
}

fn is_noi(name: &str) -> bool {
    name.contains("net operating income") || name.contains("noi")
}

fn is_unit_count(name: &str) -> bool {
    name.contains("unit") && name.contains("count")
}

fn is_occupancy_rate(name: &str) -> bool {
    name.contains("occupancy") && name.contains("rate")
}

fn is_unit_id(name: &str) -> bool {
    name.contains("unit") && (name.contains("number") || name.contains("id"))
}

fn is_tenant_name(name: &str) -> bool {
    name.contains("tenant") && name.contains("name")
}

fn is_rent(name: &str) -> bool {
    name.contains("rent") && !name.contains("date")
}

fn is_lease_start(name: &str) -> bool {
    name.contains("lease") && name.contains("start")
}

fn is_lease_end(name: &str) -> bool {
    name.contains("lease") && name.contains("end")
}

fn is_status(name: &str) -> bool {
    name.contains("status")
}

// ═══════════════════════════════════════════════════════════
// Tables
// ═══════════════════════════════════════════════════════════

const INCOME_BOUNDS: (f64, f64) = (0.0, 100_000_000.0);
const EXPENSE_BOUNDS: (f64, f64) = (0.0, 100_000_000.0);
/// NOI may legitimately be negative.
const NOI_BOUNDS: (f64, f64) = (-50_000_000.0, 100_000_000.0);

pub static T12_COLUMN_RULES: &[FieldRule<T12Field>] = &[
    FieldRule { field: T12Field::TotalIncome, matches: is_income, coerce: Coerce::Number },
    FieldRule { field: T12Field::TotalExpenses, matches: is_expenses, coerce: Coerce::Number },
    FieldRule { field: T12Field::NetOperatingIncome, matches: is_noi, coerce: Coerce::Number },
    FieldRule { field: T12Field::Units, matches: is_unit_count, coerce: Coerce::Count },
    FieldRule { field: T12Field::OccupancyRate, matches: is_occupancy_rate, coerce: Coerce::Number },
];

/// Evaluated in order; the first family that matches a line claims it.
pub static T12_LINE_RULES: &[LineRule] = &[
    LineRule { field: T12Field::TotalIncome, matches: is_income, bounds: INCOME_BOUNDS },
    LineRule { field: T12Field::TotalExpenses, matches: is_expenses, bounds: EXPENSE_BOUNDS },
    LineRule { field: T12Field::NetOperatingIncome, matches: is_noi, bounds: NOI_BOUNDS },
];

pub static RENT_ROLL_RULES: &[FieldRule<RentRollField>] = &[
    FieldRule { field: RentRollField::UnitNumber, matches: is_unit_id, coerce: Coerce::Text },
    FieldRule { field: RentRollField::TenantName, matches: is_tenant_name, coerce: Coerce::Text },
    FieldRule { field: RentRollField::RentAmount, matches: is_rent, coerce: Coerce::Number },
    FieldRule { field: RentRollField::LeaseStart, matches: is_lease_start, coerce: Coerce::Text },
    FieldRule { field: RentRollField::LeaseEnd, matches: is_lease_end, coerce: Coerce::Text },
    FieldRule { field: RentRollField::Status, matches: is_status, coerce: Coerce::Text },
];

/// Every rule in `rules` whose predicate accepts `key`, in table order.
pub fn matching_rules<'a, F: Copy>(
    rules: &'a [FieldRule<F>],
    key: &str,
) -> impl Iterator<Item = &'a FieldRule<F>> {
    let lower = key.to_lowercase();
    rules.iter().filter(move |rule| (rule.matches)(&lower))
}

/// First line rule accepting an already lower-cased line.
pub fn line_rule_for(lower_line: &str) -> Option<&'static LineRule> {
    T12_LINE_RULES.iter().find(|rule| (rule.matches)(lower_line))
}

// ═══════════════════════════════════════════════════════════
// Numeric coercion
// ═══════════════════════════════════════════════════════════

static FLOAT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap()
});
static INT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+").unwrap());
/// First currency-like token: optional `$`, optional spaces, digits with
/// optional thousands separators, optional two-digit fraction.
static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\s*([0-9,]+(?:\.[0-9]{2})?)").unwrap());

/// Longest leading decimal number after leading whitespace, ignoring any
/// trailing text (`"12.5 sq ft"` → 12.5). `None` when the text does not start
/// with a number.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let m = FLOAT_PREFIX_RE.find(text.trim_start())?;
    m.as_str().parse::<f64>().ok()
}

/// Leading integer after leading whitespace (`"12 units"` → 12, `"7.9"` → 7).
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let m = INT_PREFIX_RE.find(text.trim_start())?;
    m.as_str().parse::<i64>().ok()
}

/// Row-path number coercion: unparseable or non-finite values become 0.
pub fn coerce_number(cell: &CellValue) -> f64 {
    let value = match cell {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_float_prefix(s),
        CellValue::Bool(_) => None,
    };
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Row-path count coercion: fractional numbers truncate, unparseable values become 0.
pub fn coerce_count(cell: &CellValue) -> i64 {
    match cell {
        CellValue::Number(n) if n.is_finite() => n.trunc() as i64,
        CellValue::Text(s) => parse_int_prefix(s).unwrap_or(0),
        _ => 0,
    }
}

/// First currency-like amount in a text line, separators removed.
pub fn first_currency_amount(line: &str) -> Option<f64> {
    let caps = CURRENCY_RE.captures(line)?;
    let digits = caps.get(1)?.as_str().replace(',', "");
    digits.parse::<f64>().ok()
}
