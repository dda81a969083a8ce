//! Folder routing for files on disk, driven by a running pipeline-backend service.
//!
//! Media files are routed by MIME type alone. Text files are summarized and classified by the
//! service, and the classification becomes the folder name. Service failures fall back to
//! placeholder values so every file ends up somewhere.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use thiserror::Error;

/// Folder for files whose MIME type is `image/*`.
pub const PHOTOS_FOLDER: &str = "Photos";
/// Folder for files whose MIME type is `video/*`.
pub const VIDEOS_FOLDER: &str = "Videos";
/// Folder for files that could not be classified.
pub const UNCLASSIFIED_FOLDER: &str = "Unclassified";
/// Summary used when the summarize call fails.
pub const SUMMARY_UNAVAILABLE: &str = "Summary not available.";
/// Summary used for blank documents.
pub const EMPTY_DOCUMENT_SUMMARY: &str = "Document is empty or contains no readable text.";
/// Summary used when the file cannot be read.
pub const EXTRACTION_FAILED_SUMMARY: &str = "Processing Error: Text extraction failed.";

/// Where a file belongs, plus the summary recorded alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderAssignment {
    /// File name, without directories.
    pub file: String,
    /// Destination folder.
    pub folder: String,
    /// Summary or status note for the file.
    pub summary: String,
}

/// Errors raised while calling the analysis service.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// HTTP transport failed or the service answered with an error status.
    #[error("Analysis request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Classification returned by `POST /classify`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassifyResult {
    /// Label assigned by the service.
    pub classification: String,
    /// Score of that label.
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct SummarizeResult {
    summary: String,
}

/// Client side of the pipeline backend's document routes.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Call `POST /summarize`.
    async fn summarize(&self, text: &str) -> Result<String, AnalysisError>;
    /// Call `POST /classify`.
    async fn classify(&self, text: &str) -> Result<ClassifyResult, AnalysisError>;
}

/// HTTP implementation of [`AnalysisClient`].
pub struct ServiceClient {
    http: Client,
    base_url: String,
}

impl ServiceClient {
    /// Build a client for the service listening at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, AnalysisError> {
        let http = Client::builder().user_agent("docuintel/route").build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<T>(&self, path: &str, text: &str) -> Result<T, AnalysisError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(&json!({ "text": text }))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AnalysisClient for ServiceClient {
    async fn summarize(&self, text: &str) -> Result<String, AnalysisError> {
        let result: SummarizeResult = self.post("/summarize", text).await?;
        Ok(result.summary)
    }

    async fn classify(&self, text: &str) -> Result<ClassifyResult, AnalysisError> {
        self.post("/classify", text).await
    }
}

/// Folder and note for media types that skip text analysis.
pub fn media_folder(path: &Path) -> Option<(&'static str, &'static str)> {
    let mime = mime_guess::from_path(path).first()?;
    match mime.type_().as_str() {
        "image" => Some((PHOTOS_FOLDER, "Categorized as Image")),
        "video" => Some((VIDEOS_FOLDER, "Categorized as Video")),
        _ => None,
    }
}

/// Decide the folder for the file at `path`.
pub async fn route_file(path: &Path, client: &dyn AnalysisClient) -> FolderAssignment {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let assign = |folder: &str, summary: String| FolderAssignment {
        file: file.clone(),
        folder: folder.to_string(),
        summary,
    };

    if let Some((folder, note)) = media_folder(path) {
        return assign(folder, note.to_string());
    }

    let text = match tokio::fs::read(path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(error) => {
            tracing::error!(file = %file, %error, "Failed to read file");
            return assign(UNCLASSIFIED_FOLDER, EXTRACTION_FAILED_SUMMARY.to_string());
        }
    };

    if text.trim().is_empty() {
        tracing::warn!(file = %file, "Document has no readable text");
        return assign(UNCLASSIFIED_FOLDER, EMPTY_DOCUMENT_SUMMARY.to_string());
    }

    tracing::info!(file = %file, chars = text.chars().count(), "Calling analysis service");
    let (summary, classification) = tokio::join!(client.summarize(&text), client.classify(&text));

    let summary = summary.unwrap_or_else(|error| {
        tracing::warn!(file = %file, %error, "Summarize call failed");
        SUMMARY_UNAVAILABLE.to_string()
    });
    let classification = classification.unwrap_or_else(|error| {
        tracing::warn!(file = %file, %error, "Classify call failed");
        ClassifyResult {
            classification: UNCLASSIFIED_FOLDER.to_string(),
            confidence: 0.0,
        }
    });

    tracing::info!(
        file = %file,
        folder = %classification.classification,
        confidence = classification.confidence,
        "Assigned folder"
    );
    assign(&classification.classification, summary)
}
