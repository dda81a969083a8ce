//! HTTP adapters for runtimes speaking the Hugging Face Inference API format.
//!
//! Both pipelines post `{"inputs": ..., "parameters": ...}` to `{base}/models/{model}`.

use super::{
    ClassificationPipeline, PipelineError, SummarizationPipeline, SummaryParameters,
    ZeroShotPrediction,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;

/// Thin client bound to one model on the inference runtime.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: Client,
    base_url: String,
    model: String,
    api_token: Option<String>,
}

impl InferenceClient {
    /// Build a client for `model` served under `base_url`.
    pub fn new(
        base_url: &str,
        model: &str,
        api_token: Option<String>,
    ) -> Result<Self, PipelineError> {
        let http = Client::builder()
            .user_agent("docuintel/pipeline")
            .build()
            .map_err(|error| {
                PipelineError::Unavailable(format!("failed to construct HTTP client: {error}"))
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_token,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    async fn infer<P, R>(&self, inputs: &str, parameters: P) -> Result<R, PipelineError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let payload = json!({ "inputs": inputs, "parameters": parameters });
        let mut request = self.http.post(self.endpoint()).json(&payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|error| {
            PipelineError::Unavailable(format!(
                "failed to reach inference runtime at {}: {error}",
                self.base_url
            ))
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(PipelineError::Unavailable(format!(
                "model {} not served at {} ({status})",
                self.model,
                self.endpoint()
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::RequestFailed(format!(
                "inference runtime returned {status}: {body}"
            )));
        }

        response.json().await.map_err(|error| {
            PipelineError::InvalidResponse(format!(
                "failed to decode response from {}: {error}",
                self.model
            ))
        })
    }
}

/// Summarization pipeline backed by [`InferenceClient`].
pub struct InferenceSummarizer {
    client: InferenceClient,
}

impl InferenceSummarizer {
    /// Wrap a client pointed at a summarization model.
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SummaryCandidate {
    summary_text: String,
}

#[async_trait]
impl SummarizationPipeline for InferenceSummarizer {
    async fn summarize(
        &self,
        text: &str,
        parameters: SummaryParameters,
    ) -> Result<String, PipelineError> {
        let candidates: Vec<SummaryCandidate> = self.client.infer(text, parameters).await?;
        let first = candidates.into_iter().next().ok_or_else(|| {
            PipelineError::InvalidResponse("summarization returned no candidates".into())
        })?;
        Ok(first.summary_text)
    }
}

/// Zero-shot classification pipeline backed by [`InferenceClient`].
pub struct InferenceClassifier {
    client: InferenceClient,
}

impl InferenceClassifier {
    /// Wrap a client pointed at a zero-shot (NLI) model.
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
    multi_label: bool,
}

/// Runtimes answer either with parallel arrays or with a list of `{label, score}` records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Ranked { labels: Vec<String>, scores: Vec<f64> },
    Records(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl ZeroShotResponse {
    fn into_prediction(self) -> Result<ZeroShotPrediction, PipelineError> {
        let prediction = match self {
            Self::Ranked { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(PipelineError::InvalidResponse(format!(
                        "{} labels but {} scores",
                        labels.len(),
                        scores.len()
                    )));
                }
                ZeroShotPrediction { labels, scores }
            }
            Self::Records(records) => {
                let (labels, scores) = records
                    .into_iter()
                    .map(|record| (record.label, record.score))
                    .unzip();
                ZeroShotPrediction { labels, scores }
            }
        };
        if prediction.labels.is_empty() {
            return Err(PipelineError::InvalidResponse(
                "classification returned no labels".into(),
            ));
        }
        Ok(prediction)
    }
}

#[async_trait]
impl ClassificationPipeline for InferenceClassifier {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<ZeroShotPrediction, PipelineError> {
        let parameters = ZeroShotParameters {
            candidate_labels,
            multi_label: false,
        };
        let response: ZeroShotResponse = self.client.infer(text, parameters).await?;
        response.into_prediction()
    }
}
