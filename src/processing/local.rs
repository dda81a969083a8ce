//! Local pipeline backend: summaries and thresholded zero-shot labels.

use crate::{
    config::Config,
    pipeline::{
        ClassificationPipeline, SummarizationPipeline, SummaryParameters, load_classifier,
        load_summarizer,
    },
};
use async_trait::async_trait;
use serde::Serialize;

/// Labels offered to the zero-shot classifier.
pub const CANDIDATE_LABELS: [&str; 8] = [
    "invoice",
    "legal contract",
    "resume",
    "meeting notes",
    "scientific paper",
    "news article",
    "fiction",
    "study material",
];

/// Minimum score for the top label to be reported as-is.
pub const CONFIDENCE_THRESHOLD: f64 = 0.35;
/// Label reported when the top score falls below [`CONFIDENCE_THRESHOLD`].
pub const UNCLASSIFIED_DOCUMENT: &str = "Unclassified Document";
/// Summary returned when the summarization pipeline never loaded.
pub const SUMMARIZER_UNAVAILABLE: &str = "Summarization model is not available.";
/// Label returned when the classification pipeline never loaded.
pub const CLASSIFIER_UNAVAILABLE: &str = "Model not available.";
/// Summary returned when a loaded pipeline fails at request time.
pub const SUMMARY_FALLBACK: &str = "Summary not available.";
/// Label returned when a loaded pipeline fails at request time.
pub const CLASSIFICATION_FALLBACK: &str = "Unclassified";

/// Classification outcome reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Final label after thresholding.
    pub classification: String,
    /// Score of the top label, in `[0, 1]`.
    pub confidence: f64,
}

impl Classification {
    fn placeholder(label: &str) -> Self {
        Self {
            classification: label.to_string(),
            confidence: 0.0,
        }
    }
}

/// Keep `label` when `score` clears [`CONFIDENCE_THRESHOLD`], otherwise report
/// [`UNCLASSIFIED_DOCUMENT`]. The score is reported either way.
pub fn apply_confidence_threshold(label: &str, score: f64) -> Classification {
    let confidence = if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let classification = if confidence >= CONFIDENCE_THRESHOLD {
        label.to_string()
    } else {
        UNCLASSIFIED_DOCUMENT.to_string()
    };
    Classification {
        classification,
        confidence,
    }
}

/// Operations exposed by the local pipeline backend.
#[async_trait]
pub trait LocalProcessingApi: Send + Sync {
    /// Produce an abstractive summary, or a placeholder when the pipeline is unusable.
    async fn summarize(&self, text: &str) -> String;

    /// Classify against [`CANDIDATE_LABELS`], or return a placeholder when the pipeline is
    /// unusable.
    async fn classify(&self, text: &str) -> Classification;
}

/// Local backend holding whichever pipelines loaded at startup.
pub struct LocalProcessingService {
    summarizer: Option<Box<dyn SummarizationPipeline>>,
    classifier: Option<Box<dyn ClassificationPipeline>>,
}

impl LocalProcessingService {
    /// Assemble the service from already loaded pipelines.
    pub fn new(
        summarizer: Option<Box<dyn SummarizationPipeline>>,
        classifier: Option<Box<dyn ClassificationPipeline>>,
    ) -> Self {
        Self {
            summarizer,
            classifier,
        }
    }

    /// Load both pipelines from configuration.
    ///
    /// A pipeline that fails to load stays absent for the process lifetime; its route keeps
    /// answering with a placeholder.
    pub fn from_config(config: &Config) -> Self {
        let summarizer = match load_summarizer(config) {
            Ok(pipeline) => {
                tracing::info!(
                    model = %config.summarization_model,
                    "Summarization pipeline loaded"
                );
                Some(pipeline)
            }
            Err(error) => {
                tracing::error!(%error, "Could not load summarization pipeline");
                None
            }
        };
        let classifier = match load_classifier(config) {
            Ok(pipeline) => {
                tracing::info!(
                    model = %config.classification_model,
                    "Classification pipeline loaded"
                );
                Some(pipeline)
            }
            Err(error) => {
                tracing::error!(%error, "Could not load classification pipeline");
                None
            }
        };
        Self::new(summarizer, classifier)
    }
}

#[async_trait]
impl LocalProcessingApi for LocalProcessingService {
    async fn summarize(&self, text: &str) -> String {
        let Some(summarizer) = &self.summarizer else {
            return SUMMARIZER_UNAVAILABLE.to_string();
        };
        match summarizer.summarize(text, SummaryParameters::default()).await {
            Ok(summary) => summary,
            Err(error) => {
                tracing::warn!(%error, "Summarization failed; returning placeholder");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }

    async fn classify(&self, text: &str) -> Classification {
        let Some(classifier) = &self.classifier else {
            return Classification::placeholder(CLASSIFIER_UNAVAILABLE);
        };
        let prediction = match classifier.classify(text, &CANDIDATE_LABELS).await {
            Ok(prediction) => prediction,
            Err(error) => {
                tracing::warn!(%error, "Classification failed; returning placeholder");
                return Classification::placeholder(CLASSIFICATION_FALLBACK);
            }
        };
        match prediction.top() {
            Some((label, score)) => apply_confidence_threshold(label, score),
            None => {
                tracing::warn!("Classifier returned no usable scores; returning placeholder");
                Classification::placeholder(CLASSIFICATION_FALLBACK)
            }
        }
    }
}
