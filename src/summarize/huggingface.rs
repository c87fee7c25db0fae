//! HuggingFace Inference API summary model (BART-style seq2seq models).

use super::{SummaryBounds, SummaryModel};
use crate::error::{Result, TubedeckError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const API_BASE: &str = "https://api-inference.huggingface.co/models";

/// BART accepts 1024 tokens; 700 words stays under that for English speech.
const MAX_INPUT_WORDS: usize = 700;

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct HuggingFaceModel {
    http: reqwest::Client,
    model: String,
    api_token: String,
    api_url: String,
}

impl HuggingFaceModel {
    pub fn new(model: &str, api_token: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| TubedeckError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            model: model.to_string(),
            api_token,
            api_url: format!("{}/{}", API_BASE, model),
        })
    }

    /// Create a model using the token in `HF_API_TOKEN`.
    pub fn from_env(model: &str) -> Result<Self> {
        let token = std::env::var("HF_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                TubedeckError::Config("HF_API_TOKEN is not set".to_string())
            })?;

        Self::new(model, token)
    }

    fn request_body(text: &str, bounds: SummaryBounds) -> serde_json::Value {
        serde_json::json!({
            "inputs": text,
            "parameters": {
                "min_length": bounds.min_words,
                "max_length": bounds.max_words,
                "do_sample": false
            },
            "options": {
                "wait_for_model": true
            }
        })
    }
}

/// Pull the first summary out of an Inference API response body.
fn parse_response(body: &str) -> Result<String> {
    if let Ok(items) = serde_json::from_str::<Vec<SummaryItem>>(body) {
        return items
            .into_iter()
            .next()
            .map(|item| item.summary_text.trim().to_string())
            .ok_or_else(|| TubedeckError::Summarization("No summary generated".to_string()));
    }

    if let Ok(err) = serde_json::from_str::<ErrorBody>(body) {
        return Err(TubedeckError::Summarization(err.error));
    }

    Err(TubedeckError::Summarization(format!(
        "Unexpected response: {}",
        body.chars().take(200).collect::<String>()
    )))
}

#[async_trait]
impl SummaryModel for HuggingFaceModel {
    fn name(&self) -> &str {
        &self.model
    }

    fn max_input_words(&self) -> usize {
        MAX_INPUT_WORDS
    }

    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn summarize_window(&self, text: &str, bounds: SummaryBounds) -> Result<String> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&Self::request_body(text, bounds))
            .send()
            .await
            .map_err(|e| TubedeckError::Summarization(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Inference API answered {}", status);

        if !status.is_success() {
            let detail = parse_response(&body)
                .err()
                .map(|e| e.to_string())
                .unwrap_or_else(|| body.clone());
            return Err(TubedeckError::Summarization(format!(
                "Inference API returned {}: {}",
                status, detail
            )));
        }

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    /// Local inference endpoint answering every request with `status` and `body`.
    async fn spawn_inference(status: StatusCode, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route(
            "/models/{owner}/{name}",
            post(move |Json(request): Json<serde_json::Value>| async move {
                assert_eq!(request["parameters"]["do_sample"], false);
                (status, body)
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/models/facebook/bart-large-cnn", addr)
    }

    fn model_at(api_url: String) -> HuggingFaceModel {
        let mut model = HuggingFaceModel::new("facebook/bart-large-cnn", "t".to_string()).unwrap();
        model.api_url = api_url;
        model
    }

    #[tokio::test]
    async fn test_summarize_window_over_http() {
        let url = spawn_inference(
            StatusCode::OK,
            r#"[{"summary_text":"Edges connect nodes."}]"#,
        )
        .await;

        let summary = model_at(url)
            .summarize_window("Graphs have nodes and edges.", SummaryBounds::default())
            .await
            .unwrap();
        assert_eq!(summary, "Edges connect nodes.");
    }

    #[tokio::test]
    async fn test_loading_model_is_summarization_error() {
        let url = spawn_inference(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error":"Model facebook/bart-large-cnn is currently loading","estimated_time":20.0}"#,
        )
        .await;

        let err = model_at(url)
            .summarize_window("Graphs have nodes and edges.", SummaryBounds::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TubedeckError::Summarization(_)));
        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("currently loading"));
    }

    #[test]
    fn test_parse_summary() {
        let body = r#"[{"summary_text":" Graphs connect nodes with edges. "}]"#;
        assert_eq!(parse_response(body).unwrap(), "Graphs connect nodes with edges.");
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"error":"Model facebook/bart-large-cnn is currently loading"}"#;
        let err = parse_response(body).unwrap_err();
        assert!(err.to_string().contains("currently loading"));
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_response("[]").is_err());
        assert!(parse_response("not json").is_err());
    }

    #[test]
    fn test_request_body_is_deterministic() {
        let body = HuggingFaceModel::request_body("text", SummaryBounds::default());
        assert_eq!(body["parameters"]["min_length"], 30);
        assert_eq!(body["parameters"]["max_length"], 150);
        assert_eq!(body["parameters"]["do_sample"], false);
    }

    #[test]
    fn test_api_url() {
        let model = HuggingFaceModel::new("facebook/bart-large-cnn", "t".to_string()).unwrap();
        assert_eq!(
            model.api_url,
            "https://api-inference.huggingface.co/models/facebook/bart-large-cnn"
        );
        assert_eq!(model.max_input_words(), 700);
    }
}
