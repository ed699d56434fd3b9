//! Core domain entities.
//!
//! - [`UrlEntry`] - the `{url, token, visit_count}` aggregate
//! - [`LongUrl`] - validated long URL, compared by exact string equality
//! - [`UrlToken`] - validated eight-character short token
//! - [`SavedEntry`] - outcome of a resolve-or-create save
//!
//! Value objects are only constructed through their `parse` functions, so any
//! `LongUrl` or `UrlToken` held by a store is already well-formed.

pub mod url_entry;

pub use url_entry::{LongUrl, SavedEntry, TOKEN_ALPHABET, TOKEN_LENGTH, UrlEntry, UrlToken};
