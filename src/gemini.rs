//! Client for the hosted Gemini generative-language API.
//!
//! Only single-turn text generation is needed: one prompt in, the text of the first candidate
//! out. Interpretation of that text happens in [`crate::processing`].

use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced while talking to the generative model.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Client could not be built or the API could not be reached.
    #[error("Generative model unavailable: {0}")]
    Unavailable(String),
    /// API returned an error response.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    /// API response could not be decoded or carried no text.
    #[error("Malformed model response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by generative text models.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a free-text reply for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError>;
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Build a client for `model` using `api_key`.
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Result<Self, GeminiError> {
        let http = Client::builder()
            .user_agent("docuintel/gemini")
            .build()
            .map_err(|error| {
                GeminiError::Unavailable(format!("failed to construct HTTP client: {error}"))
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, GeminiError> {
        let api_key = config
            .gemini_api_key
            .as_deref()
            .ok_or_else(|| GeminiError::Unavailable("GEMINI_API_KEY is not configured".into()))?;
        Self::new(&config.gemini_base_url, &config.gemini_model, api_key)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                GeminiError::Unavailable(format!("failed to reach Gemini API: {error}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::GenerationFailed(format!(
                "Gemini returned {status}: {body}"
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|error| {
            GeminiError::InvalidResponse(format!("failed to decode Gemini response: {error}"))
        })?;

        if let Some(reason) = body.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Err(GeminiError::GenerationFailed(format!(
                "prompt blocked: {reason}"
            )));
        }

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeminiError::InvalidResponse(
                "response contained no text".into(),
            ));
        }
        Ok(text)
    }
}
