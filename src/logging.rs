//! Tracing configuration and log routing.
//!
//! Logs go to stdout through a compact formatter and, when the file can be opened, to an
//! append-only log file. `DOCUINTEL_LOG_FILE` selects the file; without it the service writes
//! to `logs/docuintel.log` relative to the working directory.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILE: &str = "logs/docuintel.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber.
///
/// Respects `RUST_LOG` for filtering and defaults to `info`.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    let path = log_file_path(std::env::var("DOCUINTEL_LOG_FILE").ok());
    match open_file_writer(&path) {
        Ok(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        Err(err) => {
            // The subscriber is not installed yet, so stderr is the only channel left.
            eprintln!("Failed to open log file {}: {err}", path.display());
            registry.init();
        }
    }
}

fn log_file_path(configured: Option<String>) -> PathBuf {
    configured
        .filter(|value| !value.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from)
}

fn open_file_writer(path: &Path) -> std::io::Result<NonBlocking> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Ok(non_blocking)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_path() {
        assert_eq!(log_file_path(None), PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(log_file_path(Some("  ".into())), PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(
            log_file_path(Some("/var/log/docuintel.log".into())),
            PathBuf::from("/var/log/docuintel.log")
        );
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("service.log");
        open_file_writer(&path).expect("writer");
        assert!(path.exists());
    }
}
