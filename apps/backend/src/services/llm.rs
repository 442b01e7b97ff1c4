//! Client for the local text-generation server.
//!
//! One best-effort HTTP call per request: no retry, no streaming, no
//! circuit breaking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the generation call.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Wire request for the generation endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Wire response; only the generated text is used.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// HTTP client for the model server, plus the model allow-list.
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    models: Vec<String>,
}

impl LlmClient {
    pub fn new(base_url: impl Into<String>, models: Vec<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            models,
        }
    }

    /// Build from `LLM_BASE_URL` and `LLM_MODELS` (comma-separated).
    pub fn from_env() -> Self {
        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8008".to_string());
        let models = std::env::var("LLM_MODELS")
            .unwrap_or_else(|_| "llama3.2:1b".to_string())
            .split(',')
            .map(|model| model.trim().to_string())
            .filter(|model| !model.is_empty())
            .collect();
        Self::new(base_url, models)
    }

    pub fn is_allowed(&self, model: &str) -> bool {
        self.models.iter().any(|allowed| allowed == model)
    }

    pub fn available_models(&self) -> String {
        self.models.join(", ")
    }

    /// Forward a prompt and return the generated text.
    ///
    /// Non-success upstream responses are surfaced with their status and
    /// body rather than masked.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                message: format!("Ollama error: {body}"),
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_extracts_response_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"llama3.2:1b","response":"Bonjour!","done":true}"#)
            .create_async()
            .await;

        let client = LlmClient::new(server.url(), vec!["llama3.2:1b".to_string()]);
        let text = client.generate("llama3.2:1b", "Say hello").await.unwrap();

        assert_eq!(text, "Bonjour!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_surfaces_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body("model exploded")
            .create_async()
            .await;

        let client = LlmClient::new(server.url(), vec!["llama3.2:1b".to_string()]);
        let err = client.generate("llama3.2:1b", "hi").await.unwrap_err();

        match err {
            LlmError::Upstream { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("model exploded"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn test_model_allow_list() {
        let client = LlmClient::new(
            "http://localhost:8008",
            vec!["llama3.2:1b".to_string(), "mistral:7b".to_string()],
        );
        assert!(client.is_allowed("llama3.2:1b"));
        assert!(!client.is_allowed("gpt-4"));
        assert_eq!(client.available_models(), "llama3.2:1b, mistral:7b");
    }
}
