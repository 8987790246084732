// src/gemini.rs
//
// Thin client for the Gemini generateContent endpoint. Every failure mode
// collapses to the same user-facing error; the distinguishing detail goes
// to the log.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;
use crate::models::generation::{StudyItem, StudyMode};
use crate::normalize;

/// User-facing message for any generation failure.
pub const GENERATION_FAILED: &str = "Failed to generate content from AI service.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: SystemInstruction,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Builds the system prompt for one request. The model is told to answer
/// with a bare JSON array; the normalizer cleans up when it does not listen.
fn build_prompt(
    mode: StudyMode,
    topic: &str,
    num_items: usize,
    difficulty: &str,
    include_explanations: bool,
) -> String {
    match mode {
        StudyMode::Flashcard => {
            let explanation_line = if include_explanations {
                "Include a short 'explanation' field for every card."
            } else {
                "An 'explanation' field is optional."
            };
            format!(
                "You are an expert educator. Create exactly {num_items} flashcards on the topic: {topic}.\n\
                 Difficulty: {difficulty}.\n\
                 Return ONLY a JSON array. Each item: {{\"question\":\"...\",\"answer\":\"...\"}}\n\
                 {explanation_line}"
            )
        }
        StudyMode::Mcq => {
            let explanation_line = if include_explanations {
                "Include a short 'explanation' for every question."
            } else {
                "Omit explanations."
            };
            format!(
                "You are an expert quiz maker. Create exactly {num_items} multiple-choice questions on: {topic}.\n\
                 Difficulty: {difficulty}.\n\
                 Return ONLY a JSON array. Each item must be: {{\"question\":\"...\",\"options\":[\"opt1\",\"opt2\",\"opt3\",\"opt4\"],\"correct_answer\":\"optX\"}}\n\
                 Make the options plausible. {explanation_line}"
            )
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.gemini_api_url.clone(), config.gemini_api_key.clone())
    }

    /// Requests study material and normalizes the response into items.
    pub async fn generate(
        &self,
        topic: &str,
        mode: StudyMode,
        num_items: usize,
        difficulty: &str,
        include_explanations: bool,
    ) -> Result<Vec<StudyItem>, AppError> {
        if self.api_key.is_empty() {
            tracing::error!("GEMINI_API_KEY is not configured; rejecting generation request");
            return Err(AppError::Upstream(GENERATION_FAILED.to_string()));
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: topic.to_string(),
                }],
            }],
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: build_prompt(mode, topic, num_items, difficulty, include_explanations),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let response = self
            .http
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Generation API request failed: {}", e);
                AppError::Upstream(GENERATION_FAILED.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Generation API returned {}: {}", status, body);
            return Err(AppError::Upstream(GENERATION_FAILED.to_string()));
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Generation API response was not valid JSON: {}", e);
            AppError::Upstream(GENERATION_FAILED.to_string())
        })?;

        let text = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        normalize::normalize_items(&text, mode, num_items).map_err(|e| {
            tracing::error!("Generation response unusable: {}", e);
            AppError::Upstream(GENERATION_FAILED.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flashcard_prompt_names_count_topic_and_difficulty() {
        let prompt = build_prompt(StudyMode::Flashcard, "Rust lifetimes", 7, "Advanced", true);
        assert!(prompt.contains("exactly 7 flashcards"));
        assert!(prompt.contains("Rust lifetimes"));
        assert!(prompt.contains("Difficulty: Advanced."));
        assert!(prompt.contains("JSON array"));
        assert!(prompt.contains("'explanation' field for every card"));
    }

    #[test]
    fn mcq_prompt_requests_four_options() {
        let prompt = build_prompt(StudyMode::Mcq, "Photosynthesis", 3, "Beginner", false);
        assert!(prompt.contains("3 multiple-choice questions"));
        assert!(prompt.contains("opt4"));
        assert!(prompt.contains("correct_answer"));
        assert!(prompt.contains("Omit explanations."));
    }

    #[test]
    fn envelope_text_is_the_first_part_of_the_first_candidate() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "second"}]}},
                {"content": {"parts": [{"text": "other candidate"}]}}
            ]
        }"#;
        let envelope: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let text = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        assert_eq!(text, "first");
    }

    #[test]
    fn empty_envelope_yields_empty_text() {
        let envelope: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(envelope.candidates.is_empty());
    }

    #[test]
    fn request_body_uses_the_wire_field_names() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: "t".into() }],
            }],
            system_instruction: SystemInstruction {
                parts: vec![Part { text: "sys".into() }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("systemInstruction").is_some());
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["contents"][0]["role"], "user");
    }
}
