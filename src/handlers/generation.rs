// src/handlers/generation.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    gemini::GeminiClient,
    models::generation::StudyMode,
    session::CurrentUser,
    store::GenerationStore,
};

const MAX_ITEMS: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topic: Option<String>,
    pub mode: Option<String>,
    #[serde(rename = "numItems")]
    pub num_items: Option<i64>,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub explanations: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteGenerationRequest {
    pub generation_id: Option<i64>,
}

/// Generates study items for a topic and persists the result.
///
/// All input checks run before the upstream call. A persistence failure is
/// logged but does not fail the request; the client still gets its items,
/// with a null generation_id marking that nothing was saved.
pub async fn api_generate(
    State(pool): State<SqlitePool>,
    State(gemini): State<GeminiClient>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let topic = payload.topic.as_deref().unwrap_or("").trim().to_string();
    if topic.is_empty() {
        return Err(AppError::BadRequest("Topic is required.".to_string()));
    }

    let num_items = payload.num_items.unwrap_or(5);
    if !(1..=MAX_ITEMS).contains(&num_items) {
        return Err(AppError::BadRequest(format!(
            "numItems must be between 1 and {MAX_ITEMS}."
        )));
    }

    let mode: StudyMode = payload
        .mode
        .as_deref()
        .unwrap_or("flashcard")
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("mode must be 'flashcard' or 'mcq'.".to_string()))?;

    let difficulty = match payload.difficulty.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => "Intermediate".to_string(),
    };

    let items = gemini
        .generate(&topic, mode, num_items as usize, &difficulty, payload.explanations)
        .await?;

    let content_json = serde_json::to_string(&items)?;
    let generation_id = match GenerationStore::save(&pool, user.id, &topic, mode, &content_json).await
    {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::error!("Failed to save generation for user {}: {}", user.id, e);
            None
        }
    };

    Ok(Json(json!({
        "generation_id": generation_id,
        "items": items,
    })))
}

/// Deletes one of the caller's generations.
///
/// A missing id, an unknown id, and someone else's id are all the same 404;
/// the response never confirms that a foreign row exists.
pub async fn api_delete_generation(
    State(pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<DeleteGenerationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let generation = match payload.generation_id {
        Some(id) => GenerationStore::get_by_id(&pool, id).await?,
        None => None,
    };

    let generation = generation
        .filter(|g| g.user_id == user.id)
        .ok_or_else(|| AppError::NotFound("Generation not found.".to_string()))?;

    GenerationStore::delete(&pool, generation.id).await?;

    Ok(Json(json!({ "ok": true })))
}
