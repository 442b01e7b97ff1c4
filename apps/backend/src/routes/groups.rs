//! Group endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use vocab_core::{validate_column, Pagination, SortKeyMap, SortOrder};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::words::WORD_SORT_COLUMNS;
use crate::AppState;

const GROUPS_PER_PAGE: i64 = 10;
const GROUP_WORDS_PER_PAGE: i64 = 10;
const GROUP_SESSIONS_PER_PAGE: i64 = 10;

const GROUP_SORT_COLUMNS: &[&str] = &["name", "words_count"];

/// External sort keys for the group session listing, translated to the
/// expressions of the joined session view.
static SESSION_SORT_KEYS: SortKeyMap = SortKeyMap::new(
    &[
        ("startTime", "ss.created_at"),
        ("endTime", "last_activity_time"),
        ("activityName", "sa.name"),
        ("groupName", "g.name"),
        ("reviewItemsCount", "review_items_count"),
    ],
    "ss.created_at",
);

#[derive(Debug, Deserialize)]
pub struct GroupListQuery {
    pub page: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroupScopedQuery {
    pub page: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// GET /groups
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<GroupListQuery>,
) -> Result<Json<GroupListResponse>> {
    let pagination = Pagination::fixed(query.page.as_deref(), GROUPS_PER_PAGE)?;
    let sort_column = validate_column(query.sort_by.as_deref(), GROUP_SORT_COLUMNS, "name")?;
    let order = SortOrder::parse(query.order.as_deref(), SortOrder::Asc)?;

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());

    let (groups, total) = state
        .db
        .list_groups(sort_column, order, search, &pagination)
        .await?;

    Ok(Json(GroupListResponse {
        groups: groups.iter().map(GroupRow::to_summary).collect(),
        total_pages: pagination.total_pages(total),
        current_page: pagination.page,
    }))
}

/// GET /groups/:id
pub async fn get(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<Json<GroupSummary>> {
    let group = state
        .db
        .get_group(group_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    Ok(Json(group.to_summary()))
}

/// GET /groups/:id/words
pub async fn words(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Query(query): Query<GroupScopedQuery>,
) -> Result<Json<GroupWordsResponse>> {
    let pagination = Pagination::fixed(query.page.as_deref(), GROUP_WORDS_PER_PAGE)?;
    let sort_column = validate_column(query.sort_by.as_deref(), WORD_SORT_COLUMNS, "quebecois")?;
    let order = SortOrder::parse(query.order.as_deref(), SortOrder::Asc)?;

    state
        .db
        .get_group(group_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    let (words, total) = state
        .db
        .list_group_words(group_id, sort_column, order, &pagination)
        .await?;

    Ok(Json(GroupWordsResponse {
        words,
        total_pages: pagination.total_pages(total),
        current_page: pagination.page,
    }))
}

/// GET /groups/:id/words/raw
///
/// Complete membership without pagination or sorting, for bulk
/// operations and exports.
pub async fn words_raw(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<Json<GroupWordsRawResponse>> {
    state
        .db
        .get_group(group_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    let words = state.db.group_words_raw(group_id).await?;
    let total_count = words.len() as i64;

    Ok(Json(GroupWordsRawResponse { words, total_count }))
}

/// GET /groups/:id/study_sessions
pub async fn study_sessions(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Query(query): Query<GroupScopedQuery>,
) -> Result<Json<GroupSessionsResponse>> {
    let pagination = Pagination::fixed(query.page.as_deref(), GROUP_SESSIONS_PER_PAGE)?;
    let sort_expr = SESSION_SORT_KEYS.resolve(query.sort_by.as_deref())?;
    let order = SortOrder::parse(query.order.as_deref(), SortOrder::Desc)?;

    state
        .db
        .get_group(group_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    let (sessions, total) = state
        .db
        .list_group_sessions(group_id, sort_expr, order, &pagination)
        .await?;

    Ok(Json(GroupSessionsResponse {
        study_sessions: sessions.iter().map(SessionRow::to_view).collect(),
        total_pages: pagination.total_pages(total),
        current_page: pagination.page,
    }))
}
