// src/handlers/mod.rs

pub mod auth;
pub mod download;
pub mod generation;
pub mod pages;
