//! Generative backend: one prompt yields both summary and label.

use super::prompt::{DocumentInsight, build_prompt, parse_reply};
use crate::{
    config::Config,
    gemini::{GeminiClient, GeminiError, GenerativeModel},
};
use async_trait::async_trait;

/// Operations exposed by the generative backend.
#[async_trait]
pub trait RemoteProcessingApi: Send + Sync {
    /// Summarize and classify `text` in one model call.
    ///
    /// Never fails: generation or parsing problems yield
    /// [`DocumentInsight::error_placeholder`].
    async fn process_document(&self, text: &str) -> DocumentInsight;
}

/// Generative backend wrapping a [`GenerativeModel`].
pub struct RemoteProcessingService {
    model: Box<dyn GenerativeModel>,
}

impl RemoteProcessingService {
    /// Wrap an existing model client.
    pub fn new(model: Box<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Build the Gemini-backed service from configuration.
    pub fn from_config(config: &Config) -> Result<Self, GeminiError> {
        let client = GeminiClient::from_config(config)?;
        tracing::info!(model = %config.gemini_model, "Gemini client initialized");
        Ok(Self::new(Box::new(client)))
    }
}

#[async_trait]
impl RemoteProcessingApi for RemoteProcessingService {
    async fn process_document(&self, text: &str) -> DocumentInsight {
        let prompt = build_prompt(text);
        let reply = match self.model.generate(&prompt).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(%error, "Generative model call failed; returning placeholder");
                return DocumentInsight::error_placeholder();
            }
        };
        match parse_reply(&reply) {
            Ok(insight) => insight,
            Err(error) => {
                tracing::warn!(%error, reply_chars = reply.len(), "Could not parse model reply");
                DocumentInsight::error_placeholder()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::prompt::{ERROR_SUMMARY, UNCLASSIFIED};
    use std::sync::{Arc, Mutex};

    struct ScriptedModel {
        reply: Result<String, String>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Arc::default(),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(GeminiError::GenerationFailed)
        }
    }

    #[tokio::test]
    async fn returns_parsed_insight() {
        let service = RemoteProcessingService::new(Box::new(ScriptedModel::replying(
            "```json\n{\"summary\": \"Minutes of the board meeting.\", \"classification\": \"Meeting Notes\"}\n```",
        )));
        let insight = service.process_document("Board meeting, 3 May").await;
        assert_eq!(insight.summary, "Minutes of the board meeting.");
        assert_eq!(insight.classification, "Meeting Notes");
    }

    #[tokio::test]
    async fn sends_prompt_containing_document() {
        let model = ScriptedModel::replying(r#"{"summary": "s", "classification": "Memo"}"#);
        let prompts = model.prompts.clone();
        let service = RemoteProcessingService::new(Box::new(model));

        let insight = service.process_document("Please read the attached memo").await;
        assert_eq!(insight.classification, "Memo");

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], build_prompt("Please read the attached memo"));
    }

    #[tokio::test]
    async fn malformed_reply_yields_placeholder_pair() {
        let service = RemoteProcessingService::new(Box::new(ScriptedModel::replying(
            "I think this document is an invoice.",
        )));
        let insight = service.process_document("Invoice #7").await;
        assert_eq!(insight.summary, ERROR_SUMMARY);
        assert_eq!(insight.classification, UNCLASSIFIED);
    }

    #[tokio::test]
    async fn api_failure_yields_placeholder_pair() {
        let service =
            RemoteProcessingService::new(Box::new(ScriptedModel::failing("quota exceeded")));
        assert_eq!(
            service.process_document("Anything").await,
            DocumentInsight::error_placeholder()
        );
    }
}
