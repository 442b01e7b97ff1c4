//! Word endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use vocab_core::{validate_column, Pagination, QueryError, SortOrder};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

pub(crate) const WORDS_DEFAULT_PER_PAGE: i64 = 50;
pub(crate) const WORDS_MAX_PER_PAGE: i64 = 100;

/// Sortable word columns; shared with the group-words listing.
pub(crate) const WORD_SORT_COLUMNS: &[&str] = &[
    "quebecois",
    "standard_french",
    "english",
    "correct_count",
    "wrong_count",
];

#[derive(Debug, Deserialize)]
pub struct WordListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
    pub group_id: Option<String>,
}

/// GET /words
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<WordListQuery>,
) -> Result<Json<WordListResponse>> {
    let pagination = Pagination::bounded(
        query.page.as_deref(),
        query.per_page.as_deref(),
        WORDS_DEFAULT_PER_PAGE,
        WORDS_MAX_PER_PAGE,
    )?;
    let sort_column = validate_column(query.sort_by.as_deref(), WORD_SORT_COLUMNS, "quebecois")?;
    let order = SortOrder::parse(query.order.as_deref(), SortOrder::Asc)?;

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());

    let group_id = match query.group_id.as_deref() {
        None => None,
        Some(raw) => Some(
            raw.trim()
                .parse::<i64>()
                .map_err(|_| QueryError::InvalidGroupId)?,
        ),
    };

    let (words, total_words) = state
        .db
        .list_words(sort_column, order, search, group_id, &pagination)
        .await?;

    Ok(Json(WordListResponse {
        words,
        total_pages: pagination.total_pages(total_words),
        current_page: pagination.page,
        total_words,
        per_page: pagination.per_page,
    }))
}

/// GET /words/:id
pub async fn get(
    State(state): State<AppState>,
    Path(word_id): Path<i64>,
) -> Result<Json<WordDetailResponse>> {
    let word = state
        .db
        .get_word(word_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Word not found".to_string()))?;

    let groups = state.db.word_groups(word_id).await?;

    Ok(Json(WordDetailResponse {
        word: WordDetail { word, groups },
    }))
}
