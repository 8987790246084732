// src/config.rs

use std::env;

pub const DEFAULT_GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

const DEFAULT_SESSION_SECRET: &str = "dev_secret_key_please_change";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    /// Every value has a development default so a fresh checkout runs
    /// without a .env file. `main` warns about the ones that matter.
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:studydeck.db?mode=rwc".to_string());

        let session_secret = env::var("SESSION_SECRET")
            .unwrap_or_else(|_| DEFAULT_SESSION_SECRET.to_string());

        let gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();

        let gemini_api_url = env::var("GEMINI_API_URL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            session_secret,
            gemini_api_key,
            gemini_api_url,
            port,
            rust_log,
        }
    }

    pub fn session_secret_is_default(&self) -> bool {
        self.session_secret == DEFAULT_SESSION_SECRET
    }
}
