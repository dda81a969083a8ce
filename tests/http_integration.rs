use std::collections::HashMap;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use docuintel::{api, config::Config};
use httpmock::{Method::POST, MockServer};
use serde_json::{Value, json};
use tower::ServiceExt;

fn config_with(pairs: &[(&str, &str)]) -> Config {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Config::from_lookup(|key| env.get(key).cloned()).expect("valid test configuration")
}

async fn post_text(app: &Router, path: &str, text: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(json!({ "text": text }).to_string()))
                .expect("request"),
        )
        .await
        .expect("router response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&body).expect("json body"))
}

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}

#[tokio::test]
async fn pipeline_backend_summarizes_and_thresholds() {
    let server = MockServer::start_async().await;
    let summarize = server
        .mock_async(|when, then| {
            when.method(POST).path("/models/t5-small");
            then.status(200)
                .json_body(json!([{ "summary_text": "The council approved the budget." }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/facebook/bart-large-mnli")
                .body_contains("meeting notes");
            then.status(200).json_body(json!({
                "sequence": "Council minutes",
                "labels": ["meeting notes", "news article", "invoice"],
                "scores": [0.31, 0.30, 0.05]
            }));
        })
        .await;

    let base_url = server.base_url();
    let config = config_with(&[("PIPELINE_URL", base_url.as_str())]);
    let app = api::create_app(&config).expect("pipeline app");

    let (status, body) = post_text(&app, "/summarize", "Council minutes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "The council approved the budget.");
    summarize.assert_async().await;

    let (status, body) = post_text(&app, "/classify", "Council minutes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"], "Unclassified Document");
    let confidence = body["confidence"].as_f64().expect("confidence");
    assert!((confidence - 0.31).abs() < 1e-6);
}

#[tokio::test]
async fn pipeline_backend_without_runtime_reports_unavailable_models() {
    let app = api::create_app(&config_with(&[])).expect("pipeline app");

    let (status, body) = post_text(&app, "/summarize", "Anything at all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "Summarization model is not available.");

    let (status, body) = post_text(&app, "/classify", "Anything at all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "classification": "Model not available.", "confidence": 0.0 }));
}

#[tokio::test]
async fn gemini_backend_parses_fenced_reply() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-1.5-flash:generateContent")
                .header("x-goog-api-key", "integration-key")
                .body_contains("Lease begins on 1 June");
            then.status(200).json_body(gemini_reply(
                "```json\n{\"summary\": \"A twelve month lease.\", \"classification\": \"lease agreement\"}\n```",
            ));
        })
        .await;

    let base_url = server.base_url();
    let config = config_with(&[
        ("DOCUINTEL_BACKEND", "gemini"),
        ("GEMINI_API_KEY", "integration-key"),
        ("GEMINI_BASE_URL", base_url.as_str()),
    ]);
    let app = api::create_app(&config).expect("gemini app");

    let (status, body) = post_text(&app, "/process-document", "Lease begins on 1 June").await;
    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "summary": "A twelve month lease.", "classification": "Lease Agreement" })
    );
}

#[tokio::test]
async fn gemini_backend_degrades_on_malformed_reply_and_rejects_blank_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(gemini_reply("This looks like a resume to me."));
        })
        .await;

    let base_url = server.base_url();
    let config = config_with(&[
        ("DOCUINTEL_BACKEND", "gemini"),
        ("GEMINI_API_KEY", "integration-key"),
        ("GEMINI_BASE_URL", base_url.as_str()),
    ]);
    let app = api::create_app(&config).expect("gemini app");

    let (status, body) = post_text(&app, "/process-document", "Jane Doe, engineer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "summary": "Error: Could not process the document.",
            "classification": "Unclassified"
        })
    );

    let (status, body) = post_text(&app, "/process-document", " \t\n").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Text content cannot be empty.");
}

#[tokio::test]
async fn gemini_backend_degrades_when_api_is_unreachable() {
    let config = config_with(&[
        ("DOCUINTEL_BACKEND", "gemini"),
        ("GEMINI_API_KEY", "integration-key"),
        ("GEMINI_BASE_URL", "http://127.0.0.1:9"),
    ]);
    let app = api::create_app(&config).expect("gemini app");

    let (status, body) = post_text(&app, "/process-document", "Some text").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"], "Unclassified");
}

#[tokio::test]
async fn pipeline_backend_treats_scores_just_below_threshold_as_unclassified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/models/facebook/bart-large-mnli");
            then.status(200).header("content-type", "application/json").body(
                r#"{"labels": ["invoice", "resume"], "scores": [0.3499999940395355, 0.1]}"#,
            );
        })
        .await;

    let base_url = server.base_url();
    let app = api::create_app(&config_with(&[("PIPELINE_URL", base_url.as_str())]))
        .expect("pipeline app");

    let (status, body) = post_text(&app, "/classify", "Invoice or not").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"], "Unclassified Document");
    assert_eq!(body["confidence"], 0.3499999940395355);
}
