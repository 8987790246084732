// src/store.rs

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::generation::{Generation, StudyMode};
use crate::models::user::User;

/// Account persistence. Emails are unique; the UNIQUE constraint is the
/// final arbiter even when two registrations race past the pre-check.
pub struct UserStore;

impl UserStore {
    /// Inserts a new user and returns its ID.
    /// A duplicate email surfaces as `AppError::Conflict`.
    pub async fn create(pool: &SqlitePool, email: &str, password_hash: &str) -> Result<i64, AppError> {
        let result = sqlx::query("INSERT INTO users (email, password_hash) VALUES (?, ?)")
            .bind(email)
            .bind(password_hash)
            .execute(pool)
            .await
            .map_err(|e| {
                if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                    AppError::Conflict("Email already in use.".to_string())
                } else {
                    AppError::InternalServerError(e.to_string())
                }
            })?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

/// Persistence for generated study sets.
pub struct GenerationStore;

impl GenerationStore {
    pub async fn save(
        pool: &SqlitePool,
        user_id: i64,
        topic: &str,
        mode: StudyMode,
        content_json: &str,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO generations (user_id, topic, mode, content_json) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(topic)
        .bind(mode)
        .bind(content_json)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Generation>, AppError> {
        let generation = sqlx::query_as::<_, Generation>(
            "SELECT id, user_id, topic, mode, content_json, created_at
             FROM generations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(generation)
    }

    /// All generations for one user, newest first. The id tiebreak keeps the
    /// order stable when rows share a second-resolution timestamp.
    pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Generation>, AppError> {
        let generations = sqlx::query_as::<_, Generation>(
            "SELECT id, user_id, topic, mode, content_json, created_at
             FROM generations WHERE user_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(generations)
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM generations WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
