//! SQLite database operations

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

use vocab_core::{BuiltQuery, Pagination, SelectBuilder, SortOrder, SqlParam};

use crate::error::{ApiError, Result};
use crate::models::*;

/// Joined session view: session + group + activity + review statistics.
/// The end-time fallback is applied in [`SessionRow::to_view`], not here.
const SESSION_VIEW: &str = r#"
    SELECT
        ss.id,
        ss.group_id,
        g.name AS group_name,
        sa.id AS activity_id,
        sa.name AS activity_name,
        ss.created_at AS start_time,
        (SELECT MAX(reviewed_at) FROM word_review_items WHERE study_session_id = ss.id) AS last_activity_time,
        (SELECT COUNT(*) FROM word_review_items WHERE study_session_id = ss.id) AS review_items_count
    FROM study_sessions ss
    JOIN groups g ON g.id = ss.group_id
    JOIN study_activities sa ON sa.id = ss.study_activity_id
"#;

/// Word columns with aggregate counters joined in.
const WORD_COLUMNS: &str = r#"
        w.id, w.quebecois, w.standard_french, w.english,
        w.pronunciation, w.usage_notes,
        COALESCE(wr.correct_count, 0) AS correct_count,
        COALESCE(wr.wrong_count, 0) AS wrong_count
"#;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the SQLite database at the given path.
    pub async fn connect(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(ApiError::Migration)?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // === Seed Helpers ===
    //
    // Groups, words and study activities come from seed data, not the
    // REST surface. Integration tests use the same helpers.

    /// Create a group
    pub async fn create_group(&self, name: &str) -> Result<GroupRow> {
        let result = sqlx::query("INSERT INTO groups (name, created_at) VALUES (?, ?)")
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        let group = sqlx::query_as::<_, GroupRow>(
            "SELECT id, name, words_count FROM groups WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Create a word
    pub async fn create_word(
        &self,
        quebecois: &str,
        standard_french: &str,
        english: &str,
        pronunciation: Option<&str>,
        usage_notes: Option<&str>,
    ) -> Result<WordRow> {
        let result = sqlx::query(
            r#"
            INSERT INTO words (quebecois, standard_french, english, pronunciation, usage_notes)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(quebecois)
        .bind(standard_french)
        .bind(english)
        .bind(pronunciation)
        .bind(usage_notes)
        .execute(&self.pool)
        .await?;

        let word = self
            .get_word(result.last_insert_rowid())
            .await?
            .ok_or_else(|| ApiError::Internal("inserted word missing on readback".to_string()))?;

        Ok(word)
    }

    /// Link a word to a group and bump the group's membership counter
    pub async fn add_word_to_group(&self, word_id: i64, group_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO word_groups (word_id, group_id) VALUES (?, ?)")
            .bind(word_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE groups SET words_count = words_count + 1 WHERE id = ?")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Create a study activity
    pub async fn create_study_activity(
        &self,
        name: &str,
        url: Option<&str>,
        preview_url: Option<&str>,
    ) -> Result<StudyActivityRow> {
        let result = sqlx::query(
            "INSERT INTO study_activities (name, url, preview_url, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(url)
        .bind(preview_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let activity = sqlx::query_as::<_, StudyActivityRow>(
            "SELECT id, name, url, preview_url, created_at FROM study_activities WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;

        Ok(activity)
    }

    // === Group Repository ===

    /// List groups with search, sorting and pagination
    pub async fn list_groups(
        &self,
        sort_column: &str,
        order: SortOrder,
        search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<(Vec<GroupRow>, i64)> {
        let mut builder = SelectBuilder::new(
            "SELECT id, name, words_count FROM groups",
            "SELECT COUNT(*) FROM groups",
        );
        if let Some(term) = search {
            builder.search(&["name"], term);
        }
        let built = builder.build(sort_column, order, pagination);

        self.fetch_page::<GroupRow>(&built).await
    }

    /// Get group by id
    pub async fn get_group(&self, id: i64) -> Result<Option<GroupRow>> {
        let group = sqlx::query_as::<_, GroupRow>(
            "SELECT id, name, words_count FROM groups WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// List a group's words with sorting and pagination
    pub async fn list_group_words(
        &self,
        group_id: i64,
        sort_column: &str,
        order: SortOrder,
        pagination: &Pagination,
    ) -> Result<(Vec<WordRow>, i64)> {
        let mut builder = SelectBuilder::new(
            format!(
                "SELECT {WORD_COLUMNS} FROM words w \
                 JOIN word_groups wg ON w.id = wg.word_id \
                 LEFT JOIN word_reviews wr ON w.id = wr.word_id"
            ),
            "SELECT COUNT(*) FROM words w JOIN word_groups wg ON w.id = wg.word_id",
        );
        builder.filter("wg.group_id = ?", SqlParam::Int(group_id));
        let built = builder.build(sort_column, order, pagination);

        self.fetch_page::<WordRow>(&built).await
    }

    /// All of a group's words, unpaginated (bulk export)
    pub async fn group_words_raw(&self, group_id: i64) -> Result<Vec<WordRow>> {
        let words = sqlx::query_as::<_, WordRow>(&format!(
            "SELECT {WORD_COLUMNS} FROM words w \
             JOIN word_groups wg ON w.id = wg.word_id \
             LEFT JOIN word_reviews wr ON w.id = wr.word_id \
             WHERE wg.group_id = ?"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(words)
    }

    /// List a group's study sessions. `sort_expr` comes from the
    /// external-key translation table, never from raw input.
    pub async fn list_group_sessions(
        &self,
        group_id: i64,
        sort_expr: &str,
        order: SortOrder,
        pagination: &Pagination,
    ) -> Result<(Vec<SessionRow>, i64)> {
        let mut builder = SelectBuilder::new(
            SESSION_VIEW,
            "SELECT COUNT(*) FROM study_sessions ss",
        );
        builder.filter("ss.group_id = ?", SqlParam::Int(group_id));
        let built = builder.build(sort_expr, order, pagination);

        self.fetch_page::<SessionRow>(&built).await
    }

    // === Word Repository ===

    /// List words with search, group filter, sorting and pagination
    pub async fn list_words(
        &self,
        sort_column: &str,
        order: SortOrder,
        search: Option<&str>,
        group_id: Option<i64>,
        pagination: &Pagination,
    ) -> Result<(Vec<WordRow>, i64)> {
        let mut builder = SelectBuilder::new(
            format!(
                "SELECT {WORD_COLUMNS} FROM words w \
                 LEFT JOIN word_reviews wr ON w.id = wr.word_id"
            ),
            "SELECT COUNT(*) FROM words w",
        );
        if let Some(term) = search {
            builder.search(&["w.quebecois", "w.standard_french", "w.english"], term);
        }
        if let Some(group_id) = group_id {
            builder.filter(
                "w.id IN (SELECT word_id FROM word_groups WHERE group_id = ?)",
                SqlParam::Int(group_id),
            );
        }
        let built = builder.build(sort_column, order, pagination);

        self.fetch_page::<WordRow>(&built).await
    }

    /// Get word by id with aggregate counters
    pub async fn get_word(&self, id: i64) -> Result<Option<WordRow>> {
        let word = sqlx::query_as::<_, WordRow>(&format!(
            "SELECT {WORD_COLUMNS} FROM words w \
             LEFT JOIN word_reviews wr ON w.id = wr.word_id \
             WHERE w.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(word)
    }

    /// Groups a word belongs to, as a nested array for the detail view
    pub async fn word_groups(&self, word_id: i64) -> Result<Vec<GroupRef>> {
        let groups = sqlx::query_as::<_, GroupRef>(
            r#"
            SELECT g.id, g.name
            FROM groups g
            JOIN word_groups wg ON g.id = wg.group_id
            WHERE wg.word_id = ?
            ORDER BY g.name
            "#,
        )
        .bind(word_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    // === Study Session Repository ===

    /// Create a study session after confirming both references exist.
    /// Insert and readback share one transaction.
    pub async fn create_study_session(
        &self,
        group_id: i64,
        study_activity_id: i64,
    ) -> Result<SessionRow> {
        let mut tx = self.pool.begin().await?;

        let (group_exists, activity_exists) = sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT EXISTS(SELECT 1 FROM groups WHERE id = ?),
                   EXISTS(SELECT 1 FROM study_activities WHERE id = ?)
            "#,
        )
        .bind(group_id)
        .bind(study_activity_id)
        .fetch_one(&mut *tx)
        .await?;

        if !group_exists {
            return Err(ApiError::BadRequest("Group not found".to_string()));
        }
        if !activity_exists {
            return Err(ApiError::BadRequest("Study activity not found".to_string()));
        }

        let result = sqlx::query(
            "INSERT INTO study_sessions (group_id, study_activity_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(group_id)
        .bind(study_activity_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let session = sqlx::query_as::<_, SessionRow>(&format!("{SESSION_VIEW} WHERE ss.id = ?"))
            .bind(result.last_insert_rowid())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(session)
    }

    /// List study sessions, newest first
    pub async fn list_study_sessions(
        &self,
        pagination: &Pagination,
    ) -> Result<(Vec<SessionRow>, i64)> {
        let builder = SelectBuilder::new(SESSION_VIEW, "SELECT COUNT(*) FROM study_sessions ss");
        let built = builder.build("ss.created_at", SortOrder::Desc, pagination);

        self.fetch_page::<SessionRow>(&built).await
    }

    /// Get study session by id
    pub async fn get_study_session(&self, id: i64) -> Result<Option<SessionRow>> {
        let session = sqlx::query_as::<_, SessionRow>(&format!("{SESSION_VIEW} WHERE ss.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Words reviewed in a session with per-session counts
    pub async fn session_words(
        &self,
        session_id: i64,
        pagination: &Pagination,
    ) -> Result<(Vec<SessionWordRow>, i64)> {
        let words = sqlx::query_as::<_, SessionWordRow>(
            r#"
            SELECT
                w.id, w.quebecois, w.standard_french, w.english,
                COALESCE(SUM(CASE WHEN wri.correct = 1 THEN 1 ELSE 0 END), 0) AS correct_count,
                COALESCE(SUM(CASE WHEN wri.correct = 0 THEN 1 ELSE 0 END), 0) AS wrong_count
            FROM words w
            JOIN word_review_items wri ON wri.word_id = w.id
            WHERE wri.study_session_id = ?
            GROUP BY w.id
            ORDER BY w.quebecois
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(session_id)
        .bind(pagination.per_page)
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT w.id)
            FROM words w
            JOIN word_review_items wri ON wri.word_id = w.id
            WHERE wri.study_session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((words, total))
    }

    /// Whether a session exists
    pub async fn session_exists(&self, id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM study_sessions WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Append a batch of review items to a session.
    ///
    /// Every insert, plus the aggregate-counter upserts, runs in one
    /// transaction: a missing word rolls the whole batch back and no
    /// partial rows survive.
    pub async fn insert_reviews(
        &self,
        session_id: i64,
        reviews: &[(i64, bool)],
    ) -> Result<Vec<ReviewItemRow>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(reviews.len());

        for &(word_id, correct) in reviews {
            let word_exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM words WHERE id = ?)")
                    .bind(word_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !word_exists {
                return Err(ApiError::NotFound(format!("Word {word_id} not found")));
            }

            let result = sqlx::query(
                r#"
                INSERT INTO word_review_items (study_session_id, word_id, correct, reviewed_at)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(session_id)
            .bind(word_id)
            .bind(correct)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO word_reviews (word_id, correct_count, wrong_count)
                VALUES (?, ?, ?)
                ON CONFLICT(word_id) DO UPDATE SET
                    correct_count = correct_count + excluded.correct_count,
                    wrong_count = wrong_count + excluded.wrong_count
                "#,
            )
            .bind(word_id)
            .bind(i64::from(correct))
            .bind(i64::from(!correct))
            .execute(&mut *tx)
            .await?;

            let row = sqlx::query_as::<_, ReviewItemRow>(
                r#"
                SELECT wri.id, wri.word_id, w.quebecois, w.standard_french, w.english,
                       wri.correct, wri.reviewed_at
                FROM word_review_items wri
                JOIN words w ON w.id = wri.word_id
                WHERE wri.id = ?
                "#,
            )
            .bind(result.last_insert_rowid())
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Delete all review items, then all sessions (FK-safe order).
    /// Irreversible; test/dev utility.
    pub async fn reset_study_history(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM word_review_items")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM study_sessions")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // === Shared Helpers ===

    /// Run a built page query and its count query.
    async fn fetch_page<T>(&self, built: &BuiltQuery) -> Result<(Vec<T>, i64)>
    where
        T: Send + Unpin + for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow>,
    {
        let rows = bind_params(sqlx::query_as::<_, T>(&built.query), &built.params)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = bind_scalar(sqlx::query_scalar(&built.count_query), &built.count_params)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }
}

fn bind_params<'q, O>(
    mut query: sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::Int(value) => query.bind(*value),
            SqlParam::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}

fn bind_scalar<'q, O>(
    mut query: sqlx::query::QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> sqlx::query::QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::Int(value) => query.bind(*value),
            SqlParam::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}
