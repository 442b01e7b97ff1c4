//! Common test utilities and fixtures for integration tests.
//!
//! Each test gets its own tempfile-backed SQLite database, so tests are
//! fully isolated and need no external services.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use quebec_vocab_backend::db::Database;
use quebec_vocab_backend::models::{GroupRow, StudyActivityRow, WordRow};
use quebec_vocab_backend::routes::rate_limit::RateLimiter;
use quebec_vocab_backend::services::llm::LlmClient;
use quebec_vocab_backend::{router, AppState};

/// Unreachable model-server address for tests that never hit the proxy.
const NO_LLM: &str = "http://127.0.0.1:9";

/// Test context owning the database (and its temp directory) plus the
/// assembled router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
    _tmp: TempDir,
}

impl TestContext {
    /// Create a context with rate limiting disabled and no model server.
    pub async fn new() -> Self {
        Self::build(LlmClient::new(NO_LLM, vec!["llama3.2:1b".to_string()]), 0).await
    }

    /// Create a context whose chat proxy targets `base_url`.
    pub async fn with_llm(base_url: &str) -> Self {
        Self::build(
            LlmClient::new(base_url, vec!["llama3.2:1b".to_string()]),
            0,
        )
        .await
    }

    /// Create a context with a per-minute rate limit.
    pub async fn with_rate_limit(limit: usize) -> Self {
        Self::build(LlmClient::new(NO_LLM, vec!["llama3.2:1b".to_string()]), limit).await
    }

    async fn build(llm: LlmClient, rate_limit: usize) -> Self {
        let tmp = TempDir::new().expect("Failed to create temp dir");

        let db = Database::connect(&tmp.path().join("vocab.db"))
            .await
            .expect("Failed to open test database");

        db.run_migrations().await.expect("Failed to run migrations");

        let db = Arc::new(db);
        let state = AppState {
            db: db.clone(),
            llm: Arc::new(llm),
            rate_limiter: Arc::new(RateLimiter::per_minute(rate_limit)),
        };

        Self {
            db,
            app: router(state),
            _tmp: tmp,
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    // === Seed Helpers ===

    pub async fn seed_group(&self, name: &str) -> GroupRow {
        self.db
            .create_group(name)
            .await
            .expect("Failed to seed group")
    }

    pub async fn seed_word(
        &self,
        quebecois: &str,
        standard_french: &str,
        english: &str,
    ) -> WordRow {
        self.db
            .create_word(quebecois, standard_french, english, None, None)
            .await
            .expect("Failed to seed word")
    }

    /// Seed a word and link it to a group.
    pub async fn seed_word_in_group(
        &self,
        quebecois: &str,
        standard_french: &str,
        english: &str,
        group_id: i64,
    ) -> WordRow {
        let word = self.seed_word(quebecois, standard_french, english).await;
        self.db
            .add_word_to_group(word.id, group_id)
            .await
            .expect("Failed to link word to group");
        word
    }

    pub async fn seed_activity(&self, name: &str) -> StudyActivityRow {
        self.db
            .create_study_activity(name, None, None)
            .await
            .expect("Failed to seed study activity")
    }

    /// Seed a study session and return its id.
    pub async fn seed_session(&self, group_id: i64, activity_id: i64) -> i64 {
        self.db
            .create_study_session(group_id, activity_id)
            .await
            .expect("Failed to seed study session")
            .id
    }
}
