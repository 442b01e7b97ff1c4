//! Chat-completion proxy endpoint

use axum::{extract::State, Json};
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::models::ChatCompletionResponse;
use crate::AppState;

/// POST /v1/example-service
///
/// Validates a chat-style request, forwards the first message's content
/// to the text-generation server and reshapes the reply as a chat
/// completion with zeroed token usage.
pub async fn completions(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<ChatCompletionResponse>> {
    let model = payload
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !state.llm.is_allowed(model) {
        return Err(ApiError::BadRequest(format!(
            "Invalid model: {model}. Available models: {}",
            state.llm.available_models()
        )));
    }

    let messages = payload
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ApiError::BadRequest("Messages must be a list of message objects".to_string())
        })?;

    let first = messages
        .first()
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ApiError::BadRequest("Messages must contain at least one message object".to_string())
        })?;

    let content = first
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("Message must have 'content' field".to_string()))?;

    let generated = state.llm.generate(model, content).await?;

    Ok(Json(ChatCompletionResponse::assistant_reply(
        model, generated,
    )))
}
