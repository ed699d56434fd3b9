//! PostgreSQL implementation of the entry repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{LongUrl, SavedEntry, UrlEntry, UrlToken};
use crate::domain::repositories::{EntryRepository, MAX_TOKEN_ATTEMPTS};
use crate::error::AppError;
use crate::utils::token_generator::{OsTokenSource, TokenSource};

#[derive(sqlx::FromRow)]
struct EntryRow {
    token: String,
    url: String,
    visit_count: i64,
}

impl TryFrom<EntryRow> for UrlEntry {
    type Error = AppError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| {
            AppError::store(
                "Corrupt url entry row",
                json!({ "token": row.token, "reason": reason }),
            )
        };

        let token = UrlToken::parse(&row.token).map_err(|e| corrupt(e.to_string()))?;
        let url = LongUrl::parse(&row.url).map_err(|e| corrupt(e.to_string()))?;
        let visit_count = u64::try_from(row.visit_count).map_err(|e| corrupt(e.to_string()))?;

        Ok(UrlEntry {
            url,
            token,
            visit_count,
        })
    }
}

/// PostgreSQL repository backed by the `url_entries` table.
///
/// Uniqueness is enforced twice: by the token probe before each insert and by
/// the primary key / `url_entries_url_key` constraints, which settle any race
/// the probe misses.
pub struct PgEntryRepository {
    pool: Arc<PgPool>,
    tokens: Arc<dyn TokenSource>,
}

impl PgEntryRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_token_source(pool, Arc::new(OsTokenSource))
    }

    /// Creates a new repository with a custom token source.
    pub fn with_token_source(pool: Arc<PgPool>, tokens: Arc<dyn TokenSource>) -> Self {
        Self { pool, tokens }
    }

    async fn token_taken(&self, token: &UrlToken) -> Result<bool, AppError> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM url_entries WHERE token = $1)")
                .bind(token.as_str())
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(taken)
    }

    /// Inserts unless the token or URL is already present.
    ///
    /// Returns `None` when a unique constraint swallowed the insert.
    async fn insert_if_absent(
        &self,
        token: &UrlToken,
        url: &LongUrl,
    ) -> Result<Option<UrlEntry>, AppError> {
        let row: Option<EntryRow> = sqlx::query_as(
            r#"
            INSERT INTO url_entries (token, url)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING token, url, visit_count
            "#,
        )
        .bind(token.as_str())
        .bind(url.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(UrlEntry::try_from).transpose()
    }
}

#[async_trait]
impl EntryRepository for PgEntryRepository {
    async fn save_url(&self, url: &LongUrl) -> Result<SavedEntry, AppError> {
        if let Some(existing) = self.find_by_url(url).await? {
            return Ok(SavedEntry::existing(existing));
        }

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let token = self.tokens.next_token()?;

            if self.token_taken(&token).await? {
                tracing::warn!(attempt, "token collision, retrying");
                continue;
            }

            if let Some(created) = self.insert_if_absent(&token, url).await? {
                return Ok(SavedEntry::created(created));
            }

            // Either another writer stored this URL first, or took the token
            // between the probe and the insert.
            if let Some(existing) = self.find_by_url(url).await? {
                tracing::debug!(url = %url, "url stored by a concurrent writer");
                return Ok(SavedEntry::existing(existing));
            }

            tracing::warn!(attempt, "token taken concurrently, retrying");
        }

        Err(AppError::TokenSpaceExhausted {
            attempts: MAX_TOKEN_ATTEMPTS,
        })
    }

    async fn save_visit(&self, token: &UrlToken) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE url_entries
            SET visit_count = visit_count + 1
            WHERE token = $1
            "#,
        )
        .bind(token.as_str())
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Url entry not found",
                json!({ "token": token.as_str() }),
            ));
        }

        Ok(())
    }

    async fn find_by_token(&self, token: &UrlToken) -> Result<Option<UrlEntry>, AppError> {
        let row: Option<EntryRow> = sqlx::query_as(
            r#"
            SELECT token, url, visit_count
            FROM url_entries
            WHERE token = $1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(UrlEntry::try_from).transpose()
    }

    async fn find_by_url(&self, url: &LongUrl) -> Result<Option<UrlEntry>, AppError> {
        let row: Option<EntryRow> = sqlx::query_as(
            r#"
            SELECT token, url, visit_count
            FROM url_entries
            WHERE url = $1
            "#,
        )
        .bind(url.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(UrlEntry::try_from).transpose()
    }

    async fn count(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_entries")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn truncate(&self) -> Result<(), AppError> {
        sqlx::query("TRUNCATE url_entries")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
