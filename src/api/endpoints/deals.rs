//! `POST /api/v1/deal` — underwriting decision for a fully described deal.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Principal};
use crate::pipeline::underwriting::{DealDecision, UnderwritingPayload};

/// Raw request body. Each input is kept as received so no client field is
/// lost on the way to the decision engine.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRequest {
    #[serde(default)]
    pub user_data: Option<Value>,
    #[serde(default)]
    pub t12_data: Option<Value>,
    #[serde(default)]
    pub rent_roll_data: Option<Value>,
    #[serde(default)]
    pub property_data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct DealResponse {
    pub message: &'static str,
    pub data: DealDecision,
}

pub async fn evaluate(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<DealRequest>, JsonRejection>,
) -> Result<Json<DealResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let payload = UnderwritingPayload::assemble(
        request.user_data,
        request.t12_data,
        request.rent_roll_data,
        request.property_data,
    )?;

    let evaluator = ctx.evaluator.clone();
    let decision = tokio::task::spawn_blocking(move || evaluator.evaluate(&payload))
        .await
        .map_err(|e| ApiError::Internal(format!("decision task failed: {e}")))??;

    tracing::info!(
        subject = %principal.subject,
        decision = ?decision.decision,
        "Deal decision returned"
    );

    Ok(Json(DealResponse {
        message: "response fetched",
        data: decision,
    }))
}
