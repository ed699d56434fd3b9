//! In-memory implementation of the entry repository.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{LongUrl, SavedEntry, UrlEntry, UrlToken};
use crate::domain::repositories::{EntryRepository, MAX_TOKEN_ATTEMPTS};
use crate::error::AppError;
use crate::utils::token_generator::{OsTokenSource, TokenSource};

/// Entry storage plus the two lookup indexes into it.
///
/// Both indexes hold positions in `entries`, so a visit-count change made
/// through one index is seen through the other.
#[derive(Default)]
struct Entries {
    entries: Vec<UrlEntry>,
    by_token: HashMap<UrlToken, usize>,
    by_url: HashMap<LongUrl, usize>,
}

impl Entries {
    fn get_by_token(&self, token: &UrlToken) -> Option<&UrlEntry> {
        self.by_token.get(token).map(|&i| &self.entries[i])
    }

    fn get_by_url(&self, url: &LongUrl) -> Option<&UrlEntry> {
        self.by_url.get(url).map(|&i| &self.entries[i])
    }

    fn insert(&mut self, entry: UrlEntry) -> &UrlEntry {
        let index = self.entries.len();
        self.by_token.insert(entry.token.clone(), index);
        self.by_url.insert(entry.url.clone(), index);
        self.entries.push(entry);
        &self.entries[index]
    }
}

/// Process-local repository for development, tests and seeding benchmarks.
///
/// All state sits behind one lock. A save holds the write lock across the
/// lookup, token draw and insert, so an entry is never visible through one
/// index but not the other, and concurrent saves of the same URL cannot both
/// create an entry.
pub struct MemoryEntryRepository {
    inner: RwLock<Entries>,
    tokens: Arc<dyn TokenSource>,
}

impl MemoryEntryRepository {
    /// Creates an empty repository drawing tokens from the OS random source.
    pub fn new() -> Self {
        Self::with_token_source(Arc::new(OsTokenSource))
    }

    /// Creates an empty repository with a custom token source.
    pub fn with_token_source(tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            inner: RwLock::new(Entries::default()),
            tokens,
        }
    }
}

impl Default for MemoryEntryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntryRepository for MemoryEntryRepository {
    async fn save_url(&self, url: &LongUrl) -> Result<SavedEntry, AppError> {
        let mut entries = self.inner.write();

        if let Some(existing) = entries.get_by_url(url) {
            return Ok(SavedEntry::existing(existing.clone()));
        }

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let token = self.tokens.next_token()?;

            if entries.by_token.contains_key(&token) {
                tracing::warn!(attempt, "token collision, retrying");
                continue;
            }

            let entry = entries.insert(UrlEntry::new(url.clone(), token));
            return Ok(SavedEntry::created(entry.clone()));
        }

        Err(AppError::TokenSpaceExhausted {
            attempts: MAX_TOKEN_ATTEMPTS,
        })
    }

    async fn save_visit(&self, token: &UrlToken) -> Result<(), AppError> {
        let mut entries = self.inner.write();

        let Some(&index) = entries.by_token.get(token) else {
            return Err(AppError::not_found(
                "Url entry not found",
                json!({ "token": token.as_str() }),
            ));
        };

        entries.entries[index].visit_count += 1;
        Ok(())
    }

    async fn find_by_token(&self, token: &UrlToken) -> Result<Option<UrlEntry>, AppError> {
        Ok(self.inner.read().get_by_token(token).cloned())
    }

    async fn find_by_url(&self, url: &LongUrl) -> Result<Option<UrlEntry>, AppError> {
        Ok(self.inner.read().get_by_url(url).cloned())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.inner.read().entries.len() as u64)
    }

    async fn truncate(&self) -> Result<(), AppError> {
        *self.inner.write() = Entries::default();
        Ok(())
    }
}
