//! `POST /rag/ingest-document` and `POST /rag/ingest-schema`.
//!
//! Both take a multipart form with a `file` part and a `context` part
//! holding a JSON-encoded model context.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::error::ApiError;
use super::state::AppState;
use crate::context::ModelContext;
use crate::error::IngestError;
use crate::ingest;

/// A parsed upload form.
struct Upload {
    filename: String,
    bytes: Vec<u8>,
    ctx: ModelContext,
}

async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Upload, ApiError> {
    let mut multipart = multipart?;
    let mut file = None;
    let mut context = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?.to_vec();
                file = Some((filename, bytes));
            }
            Some("context") => context = Some(field.text().await?),
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| ApiError::unprocessable("missing form field: file"))?;
    let context = context.ok_or_else(|| ApiError::unprocessable("missing form field: context"))?;
    let ctx = ModelContext::from_json_str(&context)?;
    Ok(Upload {
        filename,
        bytes,
        ctx,
    })
}

/// Loads, chunks and stores a document.
///
/// Unsupported extensions answer 200 with `{"error": ...}` and leave the
/// store untouched.
pub async fn ingest_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;
    let result = ingest::ingest_document(
        state.gateways().stores.as_ref(),
        &upload.filename,
        &upload.bytes,
        &upload.ctx,
    )
    .await;

    match result {
        Ok(done) => Ok(Json(done).into_response()),
        Err(e @ IngestError::UnsupportedFileType(_)) => {
            Ok(Json(json!({ "error": e.to_string() })).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Stores one chunk per table of a schema description.
pub async fn ingest_schema(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;
    let done = ingest::ingest_schema(
        state.gateways().stores.as_ref(),
        &upload.bytes,
        &upload.ctx,
        state.db_locations(),
    )
    .await?;
    Ok(Json(done).into_response())
}
