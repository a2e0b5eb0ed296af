//! AI text generation service
//!
//! Thin client for the Gemini `generateContent` API. The storefront must
//! keep working without a key and without network access, so every failure
//! path degrades to a canned placeholder instead of an error.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Clone)]
pub struct AiService {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl AiService {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client, api_key }
    }

    /// Generate text for a prompt. Never fails: missing key, network
    /// errors and malformed responses all fall back to a placeholder.
    pub async fn generate(&self, prompt: &str) -> String {
        let Some(key) = &self.api_key else {
            tracing::debug!("AI key not configured, returning placeholder");
            return Self::placeholder(prompt);
        };

        match self.call_gemini(key, prompt).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                tracing::warn!("AI provider returned an empty response");
                Self::placeholder(prompt)
            }
            Err(e) => {
                tracing::warn!(error = %e, "AI provider call failed");
                Self::placeholder(prompt)
            }
        }
    }

    async fn call_gemini(&self, key: &str, prompt: &str) -> Result<String, reqwest::Error> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response: GenerateResponse = self
            .client
            .post(format!("{GEMINI_ENDPOINT}?key={key}"))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        Ok(text)
    }

    fn placeholder(prompt: &str) -> String {
        let head: String = prompt.chars().take(120).collect();
        format!("AI response unavailable right now. Your request was: {head}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_without_key_returns_placeholder() {
        let ai = AiService::new(None);
        let out = ai.generate("Describe our masala peanuts").await;
        assert!(out.contains("Describe our masala peanuts"));
    }

    #[tokio::test]
    async fn test_placeholder_truncates_long_prompts() {
        let ai = AiService::new(None);
        let long = "x".repeat(1000);
        let out = ai.generate(&long).await;
        assert!(out.len() < 300);
    }
}
