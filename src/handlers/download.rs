// src/handlers/download.rs

use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    export,
    models::generation::StudyItem,
    session::CurrentUser,
    store::GenerationStore,
};

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub generation_id: Option<i64>,
    pub format: Option<String>,
}

/// Renders one of the caller's generations as a CSV or PDF attachment.
///
/// Ownership is checked before the format, so probing with a bad format
/// still yields 404 for rows the caller does not own.
pub async fn api_download(
    State(pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<DownloadRequest>,
) -> Result<Response, AppError> {
    let generation = match payload.generation_id {
        Some(id) => GenerationStore::get_by_id(&pool, id).await?,
        None => None,
    };

    let generation = generation
        .filter(|g| g.user_id == user.id)
        .ok_or_else(|| AppError::NotFound("Generation not found.".to_string()))?;

    let format = payload
        .format
        .as_deref()
        .unwrap_or("pdf")
        .trim()
        .to_lowercase();

    let items: Vec<StudyItem> = serde_json::from_str(&generation.content_json)?;

    let (bytes, content_type, extension) = match format.as_str() {
        "csv" => (export::csv_bytes(generation.mode, &items)?, "text/csv", "csv"),
        "pdf" => (
            export::pdf_bytes(&generation.topic, generation.mode, &items)?,
            "application/pdf",
            "pdf",
        ),
        _ => return Err(AppError::BadRequest("Invalid format".to_string())),
    };

    let filename = export::attachment_filename(&generation.topic, extension);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
