//! MongoDB implementation of the entry repository.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::domain::entities::{LongUrl, SavedEntry, UrlEntry, UrlToken};
use crate::domain::repositories::{EntryRepository, MAX_TOKEN_ATTEMPTS};
use crate::error::AppError;
use crate::utils::token_generator::{OsTokenSource, TokenSource};

/// Collection holding one document per entry.
pub const COLLECTION_NAME: &str = "url_entries";

/// Stored document shape: `{ _id: token, url, visit_count }`.
#[derive(Debug, Serialize, Deserialize)]
struct EntryDocument {
    #[serde(rename = "_id")]
    token: String,
    url: String,
    visit_count: i64,
}

impl TryFrom<EntryDocument> for UrlEntry {
    type Error = AppError;

    fn try_from(document: EntryDocument) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| {
            AppError::store(
                "Corrupt url entry document",
                json!({ "token": document.token, "reason": reason }),
            )
        };

        let token = UrlToken::parse(&document.token).map_err(|e| corrupt(e.to_string()))?;
        let url = LongUrl::parse(&document.url).map_err(|e| corrupt(e.to_string()))?;
        let visit_count =
            u64::try_from(document.visit_count).map_err(|e| corrupt(e.to_string()))?;

        Ok(UrlEntry {
            url,
            token,
            visit_count,
        })
    }
}

/// MongoDB repository backed by the `url_entries` collection.
///
/// The token is the document `_id`; URLs are kept unique by an index that is
/// created the first time the collection is touched.
pub struct MongoEntryRepository {
    collection: Collection<EntryDocument>,
    url_index: OnceCell<()>,
    tokens: Arc<dyn TokenSource>,
}

impl MongoEntryRepository {
    /// Creates a new repository on the given database.
    pub fn new(database: &Database) -> Self {
        Self::with_token_source(database, Arc::new(OsTokenSource))
    }

    /// Creates a new repository with a custom token source.
    pub fn with_token_source(database: &Database, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            collection: database.collection(COLLECTION_NAME),
            url_index: OnceCell::new(),
            tokens,
        }
    }

    /// Returns the collection once the unique `url` index exists.
    async fn entries(&self) -> Result<&Collection<EntryDocument>, AppError> {
        self.url_index
            .get_or_try_init(|| async {
                let index = IndexModel::builder()
                    .keys(doc! { "url": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build();

                self.collection.create_index(index).await?;
                tracing::debug!(collection = COLLECTION_NAME, "url index ensured");
                Ok::<_, AppError>(())
            })
            .await?;

        Ok(&self.collection)
    }

    /// Inserts `{_id: token, url}` unless the URL already has a document.
    ///
    /// Returns the stored document for `url`, which is the pre-existing one if
    /// another writer got there first. Fails with [`AppError::Conflict`] when
    /// the token belongs to a different URL.
    async fn upsert(&self, token: &UrlToken, url: &LongUrl) -> Result<Option<UrlEntry>, AppError> {
        let document = self
            .entries()
            .await?
            .find_one_and_update(
                doc! { "url": url.as_str() },
                doc! { "$setOnInsert": { "_id": token.as_str(), "visit_count": 0_i64 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;

        document.map(UrlEntry::try_from).transpose()
    }
}

#[async_trait]
impl EntryRepository for MongoEntryRepository {
    async fn save_url(&self, url: &LongUrl) -> Result<SavedEntry, AppError> {
        if let Some(existing) = self.find_by_url(url).await? {
            return Ok(SavedEntry::existing(existing));
        }

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let token = self.tokens.next_token()?;

            if self.find_by_token(&token).await?.is_some() {
                tracing::warn!(attempt, "token collision, retrying");
                continue;
            }

            match self.upsert(&token, url).await {
                Ok(Some(entry)) if entry.token == token => return Ok(SavedEntry::created(entry)),
                Ok(Some(entry)) => return Ok(SavedEntry::existing(entry)),
                Ok(None) => {}
                Err(AppError::Conflict { .. }) => {
                    // Duplicate key: either the URL index (concurrent writer)
                    // or `_id` (token taken since the probe).
                    if let Some(existing) = self.find_by_url(url).await? {
                        tracing::debug!(url = %url, "url stored by a concurrent writer");
                        return Ok(SavedEntry::existing(existing));
                    }
                }
                Err(e) => return Err(e),
            }

            tracing::warn!(attempt, "token taken concurrently, retrying");
        }

        Err(AppError::TokenSpaceExhausted {
            attempts: MAX_TOKEN_ATTEMPTS,
        })
    }

    async fn save_visit(&self, token: &UrlToken) -> Result<(), AppError> {
        let result = self
            .entries()
            .await?
            .update_one(
                doc! { "_id": token.as_str() },
                doc! { "$inc": { "visit_count": 1_i64 } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::not_found(
                "Url entry not found",
                json!({ "token": token.as_str() }),
            ));
        }

        Ok(())
    }

    async fn find_by_token(&self, token: &UrlToken) -> Result<Option<UrlEntry>, AppError> {
        let document = self
            .entries()
            .await?
            .find_one(doc! { "_id": token.as_str() })
            .await?;

        document.map(UrlEntry::try_from).transpose()
    }

    async fn find_by_url(&self, url: &LongUrl) -> Result<Option<UrlEntry>, AppError> {
        let document = self
            .entries()
            .await?
            .find_one(doc! { "url": url.as_str() })
            .await?;

        document.map(UrlEntry::try_from).transpose()
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.entries().await?.count_documents(doc! {}).await?)
    }

    async fn truncate(&self) -> Result<(), AppError> {
        self.entries().await?.delete_many(doc! {}).await?;
        Ok(())
    }
}
