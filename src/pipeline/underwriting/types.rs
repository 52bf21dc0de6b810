use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::property::grade_crime_index;
use super::UnderwritingError;

/// The four inputs of one underwriting request, in canonical JSON form.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UnderwritingPayload {
    user: Value,
    t12: Value,
    rent_roll: Value,
    property: Value,
}

impl UnderwritingPayload {
    /// Join raw JSON inputs. Any input that is absent or `null` is rejected,
    /// naming the first missing field. A raw crime index on the property data
    /// is graded when no crime rating accompanies it.
    pub fn assemble(
        user: Option<Value>,
        t12: Option<Value>,
        rent_roll: Option<Value>,
        property: Option<Value>,
    ) -> Result<Self, UnderwritingError> {
        let user = require("userData", user)?;
        let t12 = require("t12Data", t12)?;
        let rent_roll = require("rentRollData", rent_roll)?;
        let mut property = require("propertyData", property)?;
        if let Some(grade) = grade_crime_index(&mut property) {
            tracing::debug!(grade, "Crime rating derived from crime index");
        }

        Ok(Self {
            user,
            t12,
            rent_roll,
            property,
        })
    }

    pub fn user(&self) -> &Value {
        &self.user
    }

    pub fn t12(&self) -> &Value {
        &self.t12
    }

    pub fn rent_roll(&self) -> &Value {
        &self.rent_roll
    }

    pub fn property(&self) -> &Value {
        &self.property
    }
}

fn require(name: &'static str, value: Option<Value>) -> Result<Value, UnderwritingError> {
    match value {
        None | Some(Value::Null) => Err(UnderwritingError::MissingInput(name)),
        Some(v) => Ok(v),
    }
}

/// Versioned decision outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "PASS WITH CONDITIONS")]
    PassWithConditions,
    #[serde(rename = "FAIL")]
    Fail,
}

/// Investment metrics; `None` when inputs were insufficient to compute one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealMetrics {
    #[serde(default)]
    pub cap_rate: Option<f64>,
    #[serde(default)]
    pub coc_return: Option<f64>,
    #[serde(default)]
    pub irr: Option<f64>,
    #[serde(default)]
    pub dscr: Option<f64>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    #[serde(default)]
    pub expense_ratio: Option<f64>,
}

/// Structured reply of the decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealDecision {
    pub decision: Decision,
    /// Percentage string such as `"85%"`.
    #[serde(deserialize_with = "confidence_text")]
    pub confidence: String,
    #[serde(default)]
    pub reasoning: Vec<String>,
    #[serde(default)]
    pub metrics: DealMetrics,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<Vec<String>>,
}

/// Accept `"85%"` as-is; render a bare number as a percentage.
fn confidence_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Confidence {
        Text(String),
        Number(f64),
    }

    Ok(match Confidence::deserialize(deserializer)? {
        Confidence::Text(s) => s.trim().to_string(),
        Confidence::Number(n) if n > 0.0 && n <= 1.0 => format!("{}%", (n * 100.0).round()),
        Confidence::Number(n) => format!("{}%", n.round()),
    })
}
