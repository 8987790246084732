// src/models/generation.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// The two kinds of study material a generation can hold.
/// Stored in the 'mode' column as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum StudyMode {
    Flashcard,
    Mcq,
}

impl StudyMode {
    pub fn label(&self) -> &'static str {
        match self {
            StudyMode::Flashcard => "Flashcards",
            StudyMode::Mcq => "MCQ Quiz",
        }
    }
}

impl FromStr for StudyMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flashcard" => Ok(StudyMode::Flashcard),
            "mcq" => Ok(StudyMode::Mcq),
            _ => Err(()),
        }
    }
}

/// Represents the 'generations' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Generation {
    pub id: i64,
    pub user_id: i64,
    pub topic: String,
    pub mode: StudyMode,

    /// The normalized item list, serialized exactly as it was returned
    /// to the client that requested it.
    pub content_json: String,

    pub created_at: Option<chrono::NaiveDateTime>,
}

/// A question/answer card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// A multiple-choice question. Always carries exactly four options and a
/// correct answer that is one of them; the normalizer guarantees both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// One normalized study item. Untagged so the JSON shape is the plain
/// object clients and stored rows use; `Mcq` is tried first because it
/// requires fields a flashcard never has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudyItem {
    Mcq(McqItem),
    Flashcard(Flashcard),
}
