//! Study session endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use vocab_core::Pagination;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

const SESSIONS_DEFAULT_PER_PAGE: i64 = 10;
const SESSIONS_MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct SessionPageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// POST /api/study-sessions
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<StudySessionView>> {
    tracing::info!("creating new study session");

    let (group_id, study_activity_id) = validate_session_request(&payload)?;

    let session = state
        .db
        .create_study_session(group_id, study_activity_id)
        .await?;

    tracing::info!(session_id = session.id, "study session created");
    Ok(Json(session.to_view()))
}

/// GET /api/study-sessions
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SessionPageQuery>,
) -> Result<Json<SessionListResponse>> {
    let pagination = Pagination::bounded(
        query.page.as_deref(),
        query.per_page.as_deref(),
        SESSIONS_DEFAULT_PER_PAGE,
        SESSIONS_MAX_PER_PAGE,
    )?;

    let (sessions, total) = state.db.list_study_sessions(&pagination).await?;

    Ok(Json(SessionListResponse {
        items: sessions.iter().map(SessionRow::to_view).collect(),
        total,
        page: pagination.page,
        per_page: pagination.per_page,
        total_pages: pagination.total_pages(total),
    }))
}

/// GET /api/study-sessions/:id
pub async fn get(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Query(query): Query<SessionPageQuery>,
) -> Result<Json<SessionDetailResponse>> {
    let session = state
        .db
        .get_study_session(session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Study session not found".to_string()))?;

    let pagination = Pagination::bounded(
        query.page.as_deref(),
        query.per_page.as_deref(),
        SESSIONS_DEFAULT_PER_PAGE,
        SESSIONS_MAX_PER_PAGE,
    )?;

    let (words, total) = state.db.session_words(session_id, &pagination).await?;

    Ok(Json(SessionDetailResponse {
        session: session.to_view(),
        words,
        total,
        page: pagination.page,
        per_page: pagination.per_page,
        total_pages: pagination.total_pages(total),
    }))
}

/// POST /api/study-sessions/:id/review
///
/// Accepts `{"reviews": [{word_id, correct}, ...]}` or the legacy
/// single-object form `{word_id, correct}`; both go through the same
/// validation and one insert transaction.
pub async fn submit_review(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Json(payload): Json<Value>,
) -> Result<Json<ReviewsResponse>> {
    let reviews = validate_review_request(&payload)?;

    if !state.db.session_exists(session_id).await? {
        return Err(ApiError::NotFound("Study session not found".to_string()));
    }

    let inserted = state.db.insert_reviews(session_id, &reviews).await?;

    Ok(Json(ReviewsResponse { reviews: inserted }))
}

/// POST /api/study-sessions/reset
///
/// Clears all review history and sessions. Irreversible.
pub async fn reset(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    state.db.reset_study_history().await?;

    Ok(Json(MessageResponse {
        message: "Study history cleared successfully".to_string(),
    }))
}

/// Validate the session-creation body: both ids required, integer-coercible.
fn validate_session_request(payload: &Value) -> Result<(i64, i64)> {
    let data = payload
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("Missing request data".to_string()))?;

    for field in ["group_id", "study_activity_id"] {
        if !data.contains_key(field) {
            tracing::warn!("session creation missing field: {field}");
            return Err(ApiError::BadRequest(format!(
                "Missing required field: {field}"
            )));
        }
    }

    let group_id = coerce_id(&data["group_id"]);
    let activity_id = coerce_id(&data["study_activity_id"]);
    match (group_id, activity_id) {
        (Some(group_id), Some(activity_id)) => Ok((group_id, activity_id)),
        _ => Err(ApiError::BadRequest(
            "Invalid ID format - must be integers".to_string(),
        )),
    }
}

/// Validate a review body and normalize it to a batch.
fn validate_review_request(payload: &Value) -> Result<Vec<(i64, bool)>> {
    let data = payload
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("Missing request data".to_string()))?;

    let items: Vec<&Value> = match data.get("reviews") {
        Some(reviews) => reviews
            .as_array()
            .ok_or_else(|| ApiError::BadRequest("reviews must be an array".to_string()))?
            .iter()
            .collect(),
        // Legacy single-object form.
        None if data.contains_key("word_id") || data.contains_key("correct") => {
            vec![payload]
        }
        None => {
            return Err(ApiError::BadRequest("Missing reviews array".to_string()));
        }
    };

    if items.is_empty() {
        return Err(ApiError::BadRequest("Missing reviews array".to_string()));
    }

    let mut reviews = Vec::with_capacity(items.len());
    for item in items {
        let review = item
            .as_object()
            .ok_or_else(|| ApiError::BadRequest("reviews must be an array".to_string()))?;

        let word_id = review
            .get("word_id")
            .ok_or_else(|| ApiError::BadRequest("Missing word_id in review".to_string()))?;
        let correct = review
            .get("correct")
            .ok_or_else(|| ApiError::BadRequest("Missing correct field in review".to_string()))?;

        let correct = correct
            .as_bool()
            .ok_or_else(|| ApiError::BadRequest("correct field must be a boolean".to_string()))?;
        let word_id = coerce_id(word_id)
            .ok_or_else(|| ApiError::BadRequest("word_id must be an integer".to_string()))?;

        reviews.push((word_id, correct));
    }

    Ok(reviews)
}

/// Accept an id as a JSON integer or a numeric string.
fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
