//! Route files into folders using a running DocuIntel AI service (pipeline backend).
//!
//! Prints one JSON object per file: `{ "file", "folder", "summary" }`.
use anyhow::{Context, Result};
use clap::Parser;
use docuintel::{logging, routing};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "docuintel-route",
    about = "Assign files to folders using the DocuIntel AI service"
)]
struct Cli {
    /// Base URL of the service exposing `/summarize` and `/classify`.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    service_url: String,
    /// Files to route.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing();
    let cli = Cli::parse();

    let client = routing::ServiceClient::new(&cli.service_url)
        .with_context(|| format!("failed to build client for {}", cli.service_url))?;

    for path in &cli.files {
        let assignment = routing::route_file(path, &client).await;
        let line = serde_json::to_string(&assignment)
            .context("failed to serialize folder assignment")?;
        println!("{line}");
    }

    Ok(())
}
