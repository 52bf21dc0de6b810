use serde::{Deserialize, Serialize};

use super::matching::{Coerced, RentRollField, T12Field};
use crate::pipeline::decode::Row;

/// Canonical trailing-twelve-months operating statement.
///
/// Every field is optional: absence means the source never supplied it,
/// which stays distinguishable from an explicit zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct T12Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_expenses: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_operating_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy_rate: Option<f64>,
    /// Source rows, kept verbatim for audit. Only set on the row path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_row_data: Option<Vec<Row>>,
}

impl T12Record {
    pub fn assign(&mut self, field: T12Field, value: Coerced) {
        match (field, value) {
            (T12Field::TotalIncome, Coerced::Number(v)) => self.total_income = Some(v),
            (T12Field::TotalExpenses, Coerced::Number(v)) => self.total_expenses = Some(v),
            (T12Field::NetOperatingIncome, Coerced::Number(v)) => {
                self.net_operating_income = Some(v)
            }
            (T12Field::OccupancyRate, Coerced::Number(v)) => self.occupancy_rate = Some(v),
            (T12Field::Units, Coerced::Count(n)) => self.units = Some(n),
            (field, value) => {
                tracing::debug!(?field, ?value, "Coerced value does not fit T12 field");
            }
        }
    }

    /// True when no financial figure was recognized.
    pub fn is_empty(&self) -> bool {
        self.total_income.is_none()
            && self.total_expenses.is_none()
            && self.net_operating_income.is_none()
            && self.units.is_none()
            && self.occupancy_rate.is_none()
    }
}

/// One unit line of a rent roll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_end: Option<String>,
    pub status: String,
}

impl UnitRecord {
    pub fn assign(&mut self, field: RentRollField, value: Coerced) {
        match (field, value) {
            (RentRollField::UnitNumber, Coerced::Text(s)) => self.unit_number = Some(s),
            (RentRollField::TenantName, Coerced::Text(s)) => self.tenant_name = Some(s),
            (RentRollField::RentAmount, Coerced::Number(v)) => self.rent_amount = Some(v),
            (RentRollField::LeaseStart, Coerced::Text(s)) => self.lease_start = Some(s),
            (RentRollField::LeaseEnd, Coerced::Text(s)) => self.lease_end = Some(s),
            (RentRollField::Status, Coerced::Text(s)) => self.status = s,
            (field, value) => {
                tracing::debug!(?field, ?value, "Coerced value does not fit unit field");
            }
        }
    }
}

/// Canonical rent roll with aggregates derived from the unit lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentRollRecord {
    pub total_units: u64,
    pub occupied_units: u64,
    pub vacant_units: u64,
    /// Percentage of units occupied, 0 when there are no units.
    pub occupancy_rate: f64,
    pub total_rent: f64,
    /// Total rent over all units, 0 when there are no units.
    pub average_rent: f64,
    pub units: Vec<UnitRecord>,
    pub raw_row_data: Vec<Row>,
}
