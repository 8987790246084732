// src/routes.rs

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::handlers::{auth, download, generation, pages};
use crate::state::AppState;

/// Assembles the main application router.
///
/// * Pages render HTML and redirect anonymous visitors to /login.
/// * /api routes speak JSON and reject anonymous callers with 401.
/// * /static serves the front-end assets.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/generate", post(generation::api_generate))
        .route("/download", post(download::api_download))
        .route("/delete_generation", post(generation::api_delete_generation));

    Router::new()
        .route("/", get(pages::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/history", get(pages::history))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
