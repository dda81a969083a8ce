#![deny(missing_docs)]

//! Core library for the DocuIntel AI summarization and classification service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Hosted generative-model client.
pub mod gemini;
/// Structured logging and tracing setup.
pub mod logging;
/// Local summarization and zero-shot classification pipelines.
pub mod pipeline;
/// Validation, thresholding, and reply normalization.
pub mod processing;
/// Folder routing for files on disk.
pub mod routing;
