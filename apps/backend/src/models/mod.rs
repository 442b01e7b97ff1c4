//! Database row types and API request/response types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Minutes added to a session's start time when it has no reviews yet.
/// Display-only heuristic; never stored.
const SESSION_FALLBACK_MINUTES: i64 = 30;

// === Database Row Types ===

/// Group row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupRow {
    pub id: i64,
    pub name: String,
    pub words_count: i64,
}

impl GroupRow {
    /// Convert to the API shape (`group_name`/`word_count` field names).
    pub fn to_summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id,
            group_name: self.name.clone(),
            word_count: self.words_count,
        }
    }
}

/// Word row with aggregate review counters joined in (zero when the word
/// has never been reviewed).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WordRow {
    pub id: i64,
    pub quebecois: String,
    pub standard_french: String,
    pub english: String,
    pub pronunciation: Option<String>,
    pub usage_notes: Option<String>,
    pub correct_count: i64,
    pub wrong_count: i64,
}

/// Owning group reference on the word-detail view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupRef {
    pub id: i64,
    pub name: String,
}

/// Study activity row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudyActivityRow {
    pub id: i64,
    pub name: String,
    pub url: Option<String>,
    pub preview_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Joined study-session row: session + group name + activity name +
/// review statistics.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub group_id: i64,
    pub group_name: String,
    pub activity_id: i64,
    pub activity_name: String,
    pub start_time: DateTime<Utc>,
    pub last_activity_time: Option<DateTime<Utc>>,
    pub review_items_count: i64,
}

impl SessionRow {
    /// Convert to the API view, deriving the end time: latest review
    /// timestamp, or start + 30 minutes when the session has no reviews.
    pub fn to_view(&self) -> StudySessionView {
        let end_time = self
            .last_activity_time
            .unwrap_or(self.start_time + Duration::minutes(SESSION_FALLBACK_MINUTES));
        StudySessionView {
            id: self.id,
            group_id: self.group_id,
            group_name: self.group_name.clone(),
            activity_id: self.activity_id,
            activity_name: self.activity_name.clone(),
            start_time: self.start_time,
            end_time,
            review_items_count: self.review_items_count,
        }
    }
}

/// Inserted review item echoed back with its word text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewItemRow {
    pub id: i64,
    pub word_id: i64,
    pub quebecois: String,
    pub standard_french: String,
    pub english: String,
    pub correct: bool,
    pub reviewed_at: DateTime<Utc>,
}

/// Word as reviewed within one session, with per-session counts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionWordRow {
    pub id: i64,
    pub quebecois: String,
    pub standard_french: String,
    pub english: String,
    pub correct_count: i64,
    pub wrong_count: i64,
}

// === API Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: i64,
    pub group_name: String,
    pub word_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupListResponse {
    pub groups: Vec<GroupSummary>,
    pub total_pages: i64,
    pub current_page: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupWordsResponse {
    pub words: Vec<WordRow>,
    pub total_pages: i64,
    pub current_page: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupWordsRawResponse {
    pub words: Vec<WordRow>,
    pub total_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupSessionsResponse {
    pub study_sessions: Vec<StudySessionView>,
    pub total_pages: i64,
    pub current_page: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WordListResponse {
    pub words: Vec<WordRow>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total_words: i64,
    pub per_page: i64,
}

/// Word detail with its owning groups as a nested array.
#[derive(Debug, Serialize, Deserialize)]
pub struct WordDetail {
    #[serde(flatten)]
    pub word: WordRow,
    pub groups: Vec<GroupRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WordDetailResponse {
    pub word: WordDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySessionView {
    pub id: i64,
    pub group_id: i64,
    pub group_name: String,
    pub activity_id: i64,
    pub activity_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub review_items_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub items: Vec<StudySessionView>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionDetailResponse {
    pub session: StudySessionView,
    pub words: Vec<SessionWordRow>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewItemRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// === Chat Completion Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: i64,
    pub message: ChatMessage,
    pub finish_reason: String,
}

/// Zeroed token accounting: no tokenizer runs on the proxy path.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UsageInfo {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: UsageInfo,
}

impl ChatCompletionResponse {
    /// Wrap generated text as a single assistant reply.
    pub fn assistant_reply(model: &str, content: String) -> Self {
        Self {
            model: model.to_string(),
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content,
                },
                finish_reason: "stop".to_string(),
            }],
            usage: UsageInfo::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_row(last_activity: Option<DateTime<Utc>>) -> SessionRow {
        SessionRow {
            id: 1,
            group_id: 2,
            group_name: "Verbs".to_string(),
            activity_id: 3,
            activity_name: "Flashcards".to_string(),
            start_time: "2026-03-01T10:00:00Z".parse().unwrap(),
            last_activity_time: last_activity,
            review_items_count: 0,
        }
    }

    #[test]
    fn test_end_time_falls_back_to_start_plus_30_minutes() {
        let view = session_row(None).to_view();
        let expected: DateTime<Utc> = "2026-03-01T10:30:00Z".parse().unwrap();
        assert_eq!(view.end_time, expected);
    }

    #[test]
    fn test_end_time_uses_latest_review() {
        let last: DateTime<Utc> = "2026-03-01T10:07:12Z".parse().unwrap();
        let view = session_row(Some(last)).to_view();
        assert_eq!(view.end_time, last);
    }

    #[test]
    fn test_assistant_reply_shape() {
        let response = ChatCompletionResponse::assistant_reply("llama3.2:1b", "Bonjour!".to_string());
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.role, "assistant");
        assert_eq!(response.choices[0].finish_reason, "stop");
        assert_eq!(response.usage.total_tokens, 0);
    }
}
