//! DTOs for the url entry endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::entities::UrlEntry;

/// Body of `POST /url-entries`.
#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub url: String,
}

/// Query of `GET /url-entries?url=...`.
#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

/// A stored entry as returned by every entry endpoint.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub token: String,
    pub url: String,
    pub visit_count: u64,
}

impl From<UrlEntry> for EntryResponse {
    fn from(entry: UrlEntry) -> Self {
        Self {
            token: entry.token.into(),
            url: entry.url.into(),
            visit_count: entry.visit_count,
        }
    }
}
