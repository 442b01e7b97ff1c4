//! Test fixtures and factory functions for request bodies.

use serde_json::{json, Value};

/// Create a study-session creation body.
pub fn study_session_request(group_id: i64, study_activity_id: i64) -> Value {
    json!({
        "group_id": group_id,
        "study_activity_id": study_activity_id,
    })
}

/// Create a batch review body.
pub fn review_batch(reviews: &[(i64, bool)]) -> Value {
    json!({
        "reviews": reviews
            .iter()
            .map(|(word_id, correct)| json!({"word_id": word_id, "correct": correct}))
            .collect::<Vec<_>>(),
    })
}

/// Create a legacy single-review body.
pub fn single_review(word_id: i64, correct: bool) -> Value {
    json!({"word_id": word_id, "correct": correct})
}

/// Create a chat-completion request body.
pub fn chat_request(model: &str, content: &str) -> Value {
    json!({
        "model": model,
        "messages": [{"role": "user", "content": content}],
    })
}
