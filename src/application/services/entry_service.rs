//! Url entry creation, lookup and visit recording.

use std::sync::Arc;

use crate::domain::entities::{LongUrl, SavedEntry, UrlEntry, UrlToken};
use crate::domain::repositories::EntryRepository;
use crate::error::AppError;
use serde_json::json;

/// Boundary the rest of the application calls for url entries.
///
/// Every operation validates its raw input before touching the repository, so
/// a [`AppError::Validation`] always means malformed input and never depends
/// on what is stored. Repository errors are passed through unchanged.
pub struct EntryService<R: EntryRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: EntryRepository + ?Sized> EntryService<R> {
    /// Creates a new entry service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Resolves or creates the entry for a raw URL.
    ///
    /// Idempotent: saving a URL that already has an entry returns that entry
    /// with `created == false` and leaves its visit count alone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is empty, unparsable or hostless.
    /// Returns [`AppError::TokenSpaceExhausted`] or [`AppError::Store`] from the repository.
    pub async fn save_url(&self, raw_url: &str) -> Result<SavedEntry, AppError> {
        let url = LongUrl::parse(raw_url)?;

        let saved = self.repository.save_url(&url).await?;
        if saved.created {
            tracing::debug!(token = %saved.entry.token, url = %saved.entry.url, "url entry created");
        }

        Ok(saved)
    }

    /// Retrieves an entry by its token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the token is malformed.
    /// Returns [`AppError::NotFound`] if no entry owns the token.
    pub async fn get_by_token(&self, raw_token: &str) -> Result<UrlEntry, AppError> {
        let token = UrlToken::parse(raw_token)?;

        self.repository
            .find_by_token(&token)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Url entry not found", json!({ "token": raw_token }))
            })
    }

    /// Retrieves an entry by its exact URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is malformed.
    /// Returns [`AppError::NotFound`] if the URL has no entry.
    pub async fn get_by_url(&self, raw_url: &str) -> Result<UrlEntry, AppError> {
        let url = LongUrl::parse(raw_url)?;

        self.repository
            .find_by_url(&url)
            .await?
            .ok_or_else(|| AppError::not_found("Url entry not found", json!({ "url": raw_url })))
    }

    /// Adds one visit to the entry owning a token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the token is malformed.
    /// Returns [`AppError::NotFound`] if no entry owns the token.
    pub async fn record_visit(&self, raw_token: &str) -> Result<(), AppError> {
        let token = UrlToken::parse(raw_token)?;
        self.repository.save_visit(&token).await
    }

    /// Counts stored entries.
    pub async fn count(&self) -> Result<u64, AppError> {
        self.repository.count().await
    }

    /// Deletes every entry in the store.
    pub async fn truncate(&self) -> Result<(), AppError> {
        self.repository.truncate().await?;
        tracing::info!("url entries truncated");
        Ok(())
    }
}
