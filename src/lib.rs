// src/lib.rs

pub mod config;
pub mod error;
pub mod export;
pub mod gemini;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod templates;
pub mod utils;

// Re-export specific items for convenience if needed
pub use routes::create_router;
