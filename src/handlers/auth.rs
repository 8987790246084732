// src/handlers/auth.rs

use axum::{
    Form,
    extract::State,
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginForm, RegisterForm},
    session,
    store::UserStore,
    templates,
    utils::hash::{hash_password, verify_password},
};

fn auth_page_with_error(is_login: bool, message: &str) -> Response {
    Html(templates::render_auth_page(is_login, Some(message))).into_response()
}

fn redirect_home_with_session(user_id: i64, config: &Config) -> Result<Response, AppError> {
    let token = session::sign_session(user_id, &config.session_secret)?;
    Ok((
        [(header::SET_COOKIE, session::session_cookie(&token))],
        Redirect::to("/"),
    )
        .into_response())
}

pub async fn login_page() -> Html<String> {
    Html(templates::render_auth_page(true, None))
}

pub async fn register_page() -> Html<String> {
    Html(templates::render_auth_page(false, None))
}

/// Authenticates a user and installs a session cookie.
///
/// Unknown email and wrong password produce the same message so the form
/// cannot be used to probe which addresses exist.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Form(payload): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = payload.email.trim();
    let user = UserStore::get_by_email(&pool, email).await?;

    let is_valid = match &user {
        Some(user) => verify_password(&payload.password, &user.password_hash)?,
        None => false,
    };

    match user {
        Some(user) if is_valid => redirect_home_with_session(user.id, &config),
        _ => Ok(auth_page_with_error(true, "Invalid email or password.")),
    }
}

/// Registers a new account and logs it straight in.
///
/// Hashes the password using Argon2 before storing it. The duplicate-email
/// pre-check gives the friendly message; the UNIQUE constraint still catches
/// two registrations racing each other.
pub async fn register(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Form(payload): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let email = payload.email.trim().to_string();

    if UserStore::get_by_email(&pool, &email).await?.is_some() {
        return Ok(auth_page_with_error(false, "Email already in use."));
    }

    if let Err(validation_errors) = payload.validate() {
        return Ok(auth_page_with_error(false, &validation_errors.to_string()));
    }

    let password_hash = hash_password(&payload.password)?;

    let user_id = match UserStore::create(&pool, &email, &password_hash).await {
        Ok(id) => id,
        Err(AppError::Conflict(_)) => {
            return Ok(auth_page_with_error(false, "Email already in use."));
        }
        Err(e) => return Err(e),
    };

    tracing::info!("Registered new user {}", user_id);
    redirect_home_with_session(user_id, &config)
}

/// Clears the session cookie and returns to the login page.
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, session::clear_session_cookie())],
        Redirect::to("/login"),
    )
}
