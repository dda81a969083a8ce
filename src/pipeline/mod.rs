//! Abstractions over the local summarization and zero-shot classification pipelines.
//!
//! The models themselves run inside an external inference runtime. This module only knows how
//! to reach that runtime and how to read its answers; the thresholding and fallback policy
//! lives in [`crate::processing`].

mod inference;

use crate::config::Config;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use inference::{InferenceClassifier, InferenceClient, InferenceSummarizer};

/// Errors raised by pipeline clients.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Pipeline could not be loaded or the runtime could not be reached.
    #[error("Pipeline unavailable: {0}")]
    Unavailable(String),
    /// Runtime answered with an error status.
    #[error("Pipeline request failed: {0}")]
    RequestFailed(String),
    /// Runtime answer did not have the expected shape.
    #[error("Malformed pipeline response: {0}")]
    InvalidResponse(String),
}

/// Generation parameters forwarded to the summarization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryParameters {
    /// Upper bound on generated tokens.
    pub max_length: u32,
    /// Lower bound on generated tokens.
    pub min_length: u32,
    /// Truncate inputs longer than the model's context window instead of failing.
    #[serde(serialize_with = "serialize_truncation")]
    pub truncation: bool,
}

impl Default for SummaryParameters {
    fn default() -> Self {
        Self {
            max_length: 150,
            min_length: 30,
            truncation: true,
        }
    }
}

fn serialize_truncation<S>(enabled: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(if *enabled {
        "longest_first"
    } else {
        "do_not_truncate"
    })
}

/// Ranked labels returned by a zero-shot classifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZeroShotPrediction {
    /// Candidate labels, in the order the runtime returned them.
    pub labels: Vec<String>,
    /// Score for each entry of `labels`.
    pub scores: Vec<f64>,
}

impl ZeroShotPrediction {
    /// Highest scoring label and its score.
    ///
    /// Runtimes usually sort by descending score, but the maximum is taken explicitly so an
    /// unsorted answer still yields the right label.
    pub fn top(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (label, &score) in self.labels.iter().zip(&self.scores) {
            if !score.is_finite() {
                continue;
            }
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((label.as_str(), score));
            }
        }
        best
    }
}

/// Abstractive summarization pipeline.
#[async_trait]
pub trait SummarizationPipeline: Send + Sync {
    /// Summarize `text`, returning the first candidate produced by the model.
    async fn summarize(
        &self,
        text: &str,
        parameters: SummaryParameters,
    ) -> Result<String, PipelineError>;
}

/// Zero-shot classification pipeline.
#[async_trait]
pub trait ClassificationPipeline: Send + Sync {
    /// Score `text` against every entry of `candidate_labels`.
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<ZeroShotPrediction, PipelineError>;
}

/// Load the summarization pipeline described by `config`.
pub fn load_summarizer(
    config: &Config,
) -> Result<Box<dyn SummarizationPipeline>, PipelineError> {
    let client = runtime_client(config, &config.summarization_model)?;
    Ok(Box::new(InferenceSummarizer::new(client)))
}

/// Load the zero-shot classification pipeline described by `config`.
pub fn load_classifier(
    config: &Config,
) -> Result<Box<dyn ClassificationPipeline>, PipelineError> {
    let client = runtime_client(config, &config.classification_model)?;
    Ok(Box::new(InferenceClassifier::new(client)))
}

fn runtime_client(config: &Config, model: &str) -> Result<InferenceClient, PipelineError> {
    let base_url = config
        .pipeline_url
        .as_deref()
        .ok_or_else(|| PipelineError::Unavailable("PIPELINE_URL is not configured".into()))?;
    InferenceClient::new(base_url, model, config.pipeline_api_token.clone())
}
