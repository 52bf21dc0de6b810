//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::decode::DecodeError;
use crate::pipeline::extraction::ExtractionError;
use crate::pipeline::intake::IntakeError;
use crate::pipeline::underwriting::UnderwritingError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("File corrupted: {message}")]
    FileCorrupted { message: String, file_type: String },
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("Decision engine failed: {0}")]
    DecisionEngine(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, file_type) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
                None,
            ),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail, None),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Upload exceeds the size limit".to_string(),
                None,
            ),
            ApiError::UnsupportedFormat(detail) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT", detail, None)
            }
            ApiError::FileCorrupted { message, file_type } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "FILE_CORRUPTED",
                message,
                Some(file_type),
            ),
            ApiError::ExtractionFailed(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILED",
                detail,
                None,
            ),
            ApiError::DecisionEngine(detail) => {
                tracing::error!(detail, "Decision engine failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "DECISION_ENGINE_FAILED",
                    "The decision engine could not evaluate this deal".to_string(),
                    None,
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                file_type,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Io(e) => ApiError::Internal(e.to_string()),
            e @ IntakeError::UnsupportedFormat { .. } => ApiError::UnsupportedFormat(e.to_string()),
            IntakeError::Corrupted(verdict) => ApiError::FileCorrupted {
                message: verdict.cause().to_string(),
                file_type: verdict.file_type,
            },
            IntakeError::Decode {
                source: DecodeError::Io(e),
                ..
            } => ApiError::Internal(e.to_string()),
            IntakeError::Decode { file_type, source } => ApiError::FileCorrupted {
                message: source.to_string(),
                file_type: file_type.to_string(),
            },
            IntakeError::Extraction(e) => ApiError::from(e),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        ApiError::ExtractionFailed(err.to_string())
    }
}

impl From<UnderwritingError> for ApiError {
    fn from(err: UnderwritingError) -> Self {
        match err {
            UnderwritingError::MissingInput(_) => {
                ApiError::BadRequest("Missing parameters in body".to_string())
            }
            UnderwritingError::Serialization(e) => ApiError::Internal(e.to_string()),
            other => ApiError::DecisionEngine(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use crate::pipeline::intake::CorruptionVerdict;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
        assert!(json["error"].get("fileType").is_none());
    }

    #[tokio::test]
    async fn corrupted_upload_returns_422_with_file_type() {
        let err = ApiError::from(IntakeError::Corrupted(CorruptionVerdict {
            is_corrupted: true,
            error: Some("Missing PDF EOF marker".into()),
            file_type: "pdf".into(),
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "FILE_CORRUPTED");
        assert_eq!(json["error"]["message"], "Missing PDF EOF marker");
        assert_eq!(json["error"]["fileType"], "pdf");
    }

    #[tokio::test]
    async fn unsupported_format_returns_400() {
        let err = ApiError::from(IntakeError::UnsupportedFormat {
            document: "T12",
            accepted: "PDF or Excel",
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "UNSUPPORTED_FORMAT");
        assert_eq!(
            json["error"]["message"],
            "Unsupported file format for T12. Please use PDF or Excel files."
        );
    }

    #[tokio::test]
    async fn encrypted_pdf_returns_extraction_failed() {
        let err = ApiError::from(IntakeError::Extraction(ExtractionError::EncryptedDocument));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "EXTRACTION_FAILED");
    }

    #[tokio::test]
    async fn decode_failure_is_corruption() {
        let err = ApiError::from(IntakeError::Decode {
            file_type: "excel",
            source: DecodeError::NoWorksheet,
        });
        let json = body_json(err.into_response()).await;
        assert_eq!(json["error"]["code"], "FILE_CORRUPTED");
        assert_eq!(json["error"]["fileType"], "excel");
    }

    #[tokio::test]
    async fn missing_input_returns_400() {
        let err = ApiError::from(UnderwritingError::MissingInput("t12Data"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Missing parameters in body");
    }

    #[tokio::test]
    async fn engine_failure_returns_502_without_details() {
        let err = ApiError::from(UnderwritingError::EngineError {
            status: 500,
            body: "upstream stack trace".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "DECISION_ENGINE_FAILED");
        assert!(!json["error"]["message"].as_str().unwrap().contains("stack trace"));
    }

    #[tokio::test]
    async fn internal_returns_500() {
        let response = ApiError::Internal("something broke".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        // Internal errors hide details from client
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}
