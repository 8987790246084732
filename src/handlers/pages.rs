// src/handlers/pages.rs

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    session::OptionalUser,
    store::GenerationStore,
    templates,
};

/// The generator page; anonymous visitors go to the login form instead.
pub async fn index(OptionalUser(user): OptionalUser) -> Response {
    match user {
        Some(user) => Html(templates::render_home(&user.email)).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

/// Past generations for the logged-in user, newest first.
pub async fn history(
    State(pool): State<SqlitePool>,
    OptionalUser(user): OptionalUser,
) -> Result<Response, AppError> {
    let Some(user) = user else {
        return Ok(Redirect::to("/login").into_response());
    };

    let generations = GenerationStore::list_for_user(&pool, user.id).await?;

    // Item counts come from the stored JSON; a row that fails to parse shows
    // zero instead of taking the whole page down.
    let rows: Vec<_> = generations
        .into_iter()
        .map(|generation| {
            let count = serde_json::from_str::<Vec<serde_json::Value>>(&generation.content_json)
                .map(|items| items.len())
                .unwrap_or(0);
            (generation, count)
        })
        .collect();

    Ok(Html(templates::render_history(&user.email, &rows)).into_response())
}
