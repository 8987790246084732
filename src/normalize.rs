// src/normalize.rs
//
// Turns the free-form text a generation model returns into clean study
// items. Models asked for "ONLY a JSON array" still wrap the array in
// prose or markdown fences often enough that this has to be forgiving.

use std::fmt;

use regex::Regex;
use serde_json::Value;

use crate::models::generation::{Flashcard, McqItem, StudyItem, StudyMode};

/// Filler for missing MCQ option slots.
pub const PLACEHOLDER_OPTION: &str = "N/A";

/// Every MCQ is normalized to exactly this many options.
pub const MCQ_OPTION_COUNT: usize = 4;

/// The response text contained no parseable JSON array, or nothing in it
/// survived normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoStructuredContent;

impl fmt::Display for NoStructuredContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no structured content in generation response")
    }
}

impl std::error::Error for NoStructuredContent {}

/// Extracts the first '[' .. last ']' span and parses it as JSON.
/// If that fails, strips markdown code fences from the span and tries once
/// more. Returns `None` when no array can be recovered.
pub fn extract_json_array(text: &str) -> Option<Value> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    // The last ']' can precede the first '[' (e.g. "] oops ["). No span then.
    if end < start {
        return None;
    }

    let candidate = &text[start..=end];
    if let Ok(value) = serde_json::from_str(candidate) {
        return Some(value);
    }

    let fences = Regex::new(r"(?s)```.*?```").unwrap();
    let cleaned = fences.replace_all(candidate, "");
    serde_json::from_str(&cleaned).ok()
}

/// First non-empty string value among `keys`, or "" when none qualifies.
/// A key that is present but empty or non-string falls through to the next.
fn first_string(item: &Value, keys: &[&str]) -> String {
    for key in keys {
        if let Some(s) = item.get(*key).and_then(Value::as_str) {
            if !s.is_empty() {
                return s.to_string();
            }
        }
    }
    String::new()
}

/// First non-empty array value among `keys`.
fn first_array<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    for key in keys {
        if let Some(arr) = item.get(*key).and_then(Value::as_array) {
            if !arr.is_empty() {
                return Some(arr);
            }
        }
    }
    None
}

/// Options are usually strings, but models sometimes emit numbers or
/// booleans; render those as text instead of dropping the option.
fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A card missing its question or answer is dropped rather than shown blank.
fn normalize_flashcard(item: &Value) -> Option<Flashcard> {
    let question = first_string(item, &["question", "front", "prompt"]);
    let answer = first_string(item, &["answer", "back"]);
    if question.is_empty() || answer.is_empty() {
        return None;
    }

    Some(Flashcard {
        question,
        answer,
        explanation: first_string(item, &["explanation"]),
    })
}

/// MCQs are repaired instead of dropped: short option lists are padded to
/// four, long ones truncated, and a correct answer that is missing or not
/// among the options falls back to the first option.
fn normalize_mcq(item: &Value) -> McqItem {
    let question = first_string(item, &["question"]);

    let mut options: Vec<String> = first_array(item, &["options", "choices"])
        .map(|arr| arr.iter().take(MCQ_OPTION_COUNT).map(option_text).collect())
        .unwrap_or_default();
    while options.len() < MCQ_OPTION_COUNT {
        options.push(PLACEHOLDER_OPTION.to_string());
    }

    let mut correct_answer = first_string(item, &["correct_answer", "answer"]);
    if correct_answer.is_empty() || !options.contains(&correct_answer) {
        correct_answer = options[0].clone();
    }

    McqItem {
        question,
        options,
        correct_answer,
        explanation: first_string(item, &["explanation"]),
    }
}

/// Normalizes a raw response into at most `max_items` study items.
///
/// The cap is applied before per-item validation, so a response whose first
/// `max_items` entries include broken flashcards yields fewer items even if
/// valid ones follow. Zero surviving items is an error; callers treat it the
/// same as an upstream failure.
pub fn normalize_items(
    text: &str,
    mode: StudyMode,
    max_items: usize,
) -> Result<Vec<StudyItem>, NoStructuredContent> {
    let value = extract_json_array(text).ok_or(NoStructuredContent)?;
    let raw_items = value.as_array().ok_or(NoStructuredContent)?;

    let mut items = Vec::new();
    for raw in raw_items.iter().take(max_items) {
        match mode {
            StudyMode::Flashcard => {
                if let Some(card) = normalize_flashcard(raw) {
                    items.push(StudyItem::Flashcard(card));
                }
            }
            StudyMode::Mcq => items.push(StudyItem::Mcq(normalize_mcq(raw))),
        }
    }

    if items.is_empty() {
        return Err(NoStructuredContent);
    }
    Ok(items)
}
