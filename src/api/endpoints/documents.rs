//! Document upload endpoints: T12 and rent roll parsing.
//!
//! `POST /api/v1/t12` and `POST /api/v1/rent` receive a multipart `file`
//! field, stage it as a temporary file and run the extraction pipeline on a
//! blocking thread. The temporary file is owned by that thread and removed
//! whatever the outcome.

use std::path::PathBuf;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Principal};
use crate::pipeline::extraction::{RentRollRecord, T12Record};
use crate::pipeline::intake::{FileInfo, IntakeError, RawUpload};
use crate::pipeline::processor::{process_rent_roll, process_t12, DocumentKind};

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocumentResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub file_info: FileInfo,
}

/// A file received from the client, not yet written to disk.
struct ReceivedFile {
    name: String,
    mime_type: Option<String>,
    bytes: Vec<u8>,
}

/// `POST /api/v1/t12` — parse a T12 operating statement (PDF or Excel).
pub async fn parse_t12(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    multipart: Multipart,
) -> Result<Json<ParsedDocumentResponse<T12Record>>, ApiError> {
    let file = receive_file(multipart).await?;
    parse_document(&ctx, &principal, DocumentKind::T12, file, process_t12).await
}

/// `POST /api/v1/rent` — parse a rent roll (CSV or Excel).
pub async fn parse_rent_roll(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    multipart: Multipart,
) -> Result<Json<ParsedDocumentResponse<RentRollRecord>>, ApiError> {
    let file = receive_file(multipart).await?;
    parse_document(&ctx, &principal, DocumentKind::RentRoll, file, process_rent_roll).await
}

async fn receive_file(mut multipart: Multipart) -> Result<ReceivedFile, ApiError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e)),
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;

        return Ok(ReceivedFile {
            name,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::BadRequest("No file uploaded".into()))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

async fn parse_document<T, F>(
    ctx: &ApiContext,
    principal: &Principal,
    kind: DocumentKind,
    file: ReceivedFile,
    process: F,
) -> Result<Json<ParsedDocumentResponse<T>>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&RawUpload) -> Result<T, IntakeError> + Send + 'static,
{
    let upload_dir: PathBuf = ctx.upload_dir.as_ref().clone();

    let outcome = tokio::task::spawn_blocking(move || -> Result<(T, FileInfo), IntakeError> {
        let upload = RawUpload::stage(
            &upload_dir,
            &file.name,
            file.mime_type.as_deref(),
            &file.bytes,
        )?;
        let file_info = upload.file_info();
        let result = process(&upload);
        upload.discard();
        result.map(|data| (data, file_info))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("document task failed: {e}")))?;

    let (data, file_info) = outcome.inspect_err(|e| {
        tracing::warn!(
            subject = %principal.subject,
            document = kind.label(),
            error = %e,
            "Document rejected"
        );
    })?;

    tracing::info!(
        subject = %principal.subject,
        document = kind.label(),
        name = %file_info.original_name,
        size = file_info.size,
        "Document parsed"
    );

    Ok(Json(ParsedDocumentResponse {
        success: true,
        message: format!("{} file parsed successfully", kind.label()),
        data,
        file_info,
    }))
}
