// src/models/mod.rs

pub mod generation;
pub mod user;
