use serde::{Deserialize, Serialize};
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default summarization model served by the inference runtime.
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "t5-small";
/// Default zero-shot classification model served by the inference runtime.
pub const DEFAULT_CLASSIFICATION_MODEL: &str = "facebook/bart-large-mnli";
/// Default Gemini model used by the remote backend.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
/// Public endpoint of the Generative Language API.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the DocuIntel AI service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Which inference backend the HTTP surface exposes.
    pub backend: Backend,
    /// Base URL of the local inference runtime; `None` leaves both pipelines unloaded.
    pub pipeline_url: Option<String>,
    /// Optional bearer token sent to the inference runtime.
    pub pipeline_api_token: Option<String>,
    /// Model identifier used for abstractive summaries.
    pub summarization_model: String,
    /// Model identifier used for zero-shot classification.
    pub classification_model: String,
    /// API key for the Generative Language API. Required for the Gemini backend.
    pub gemini_api_key: Option<String>,
    /// Gemini model identifier.
    pub gemini_model: String,
    /// Base URL of the Generative Language API.
    pub gemini_base_url: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Inference backends the service can front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local summarization and zero-shot classification pipelines.
    Pipeline,
    /// Hosted Gemini generative model.
    Gemini,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as absent so that `FOO=` in a `.env` file behaves like an
    /// unset variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = match optional("DOCUINTEL_BACKEND") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("DOCUINTEL_BACKEND".into()))?,
            None => Backend::Pipeline,
        };

        let gemini_api_key = optional("GEMINI_API_KEY");
        if backend == Backend::Gemini && gemini_api_key.is_none() {
            return Err(ConfigError::MissingVariable("GEMINI_API_KEY".into()));
        }

        Ok(Self {
            backend,
            pipeline_url: optional("PIPELINE_URL"),
            pipeline_api_token: optional("PIPELINE_API_TOKEN"),
            summarization_model: optional("SUMMARIZATION_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZATION_MODEL.to_string()),
            classification_model: optional("CLASSIFICATION_MODEL")
                .unwrap_or_else(|| DEFAULT_CLASSIFICATION_MODEL.to_string()),
            gemini_api_key,
            gemini_model: optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: optional("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            server_port: optional("SERVER_PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

impl std::str::FromStr for Backend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pipeline" | "local" => Ok(Self::Pipeline),
            "gemini" | "remote" => Ok(Self::Gemini),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
///
/// A `.env` file in the working directory is honoured when present. Calling this twice keeps
/// the first configuration.
pub fn init_config() -> Result<(), ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        backend = ?config.backend,
        pipeline_url = ?config.pipeline_url,
        summarization_model = %config.summarization_model,
        classification_model = %config.classification_model,
        gemini_model = %config.gemini_model,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    let _ = CONFIG.set(config);
    Ok(())
}
