//! Repository trait for url entry storage.

use crate::domain::entities::{LongUrl, SavedEntry, UrlEntry, UrlToken};
use crate::error::AppError;
use async_trait::async_trait;

/// Upper bound on token draws for a single insert.
///
/// With 63^8 possible tokens a collision is already unlikely; hitting this many
/// in a row means the store is close to saturation.
pub const MAX_TOKEN_ATTEMPTS: usize = 16;

/// Store contract for url entries.
///
/// A repository is the only authority for uniqueness: one entry per URL and one
/// entry per token. Every implementation is safe to share between concurrent
/// workers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryEntryRepository`] - in-process maps
/// - [`crate::infrastructure::persistence::PgEntryRepository`] - PostgreSQL table
/// - [`crate::infrastructure::persistence::MongoEntryRepository`] - MongoDB collection
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Resolves or creates the entry for `url`.
    ///
    /// If the URL is already mapped, the existing entry is returned unchanged with
    /// `created == false`. Otherwise a fresh token is drawn, retried on collision
    /// up to [`MAX_TOKEN_ATTEMPTS`] times, and the new entry is stored with a
    /// visit count of zero.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TokenSpaceExhausted`] if every drawn token was taken.
    /// Returns [`AppError::Store`] on backend or random-source failures.
    async fn save_url(&self, url: &LongUrl) -> Result<SavedEntry, AppError>;

    /// Atomically adds one to the visit count of the entry owning `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no entry owns `token`.
    /// Returns [`AppError::Store`] on backend errors.
    async fn save_visit(&self, token: &UrlToken) -> Result<(), AppError>;

    /// Finds an entry by its token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on backend errors.
    async fn find_by_token(&self, token: &UrlToken) -> Result<Option<UrlEntry>, AppError>;

    /// Finds an entry by its exact URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on backend errors.
    async fn find_by_url(&self, url: &LongUrl) -> Result<Option<UrlEntry>, AppError>;

    /// Counts stored entries.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on backend errors.
    async fn count(&self) -> Result<u64, AppError>;

    /// Removes every entry. Used by the seeder before a fresh run.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on backend errors.
    async fn truncate(&self) -> Result<(), AppError>;
}
