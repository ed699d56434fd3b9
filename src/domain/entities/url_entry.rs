//! Url entry aggregate and its two value objects.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::error::AppError;

/// Number of characters in every token.
pub const TOKEN_LENGTH: usize = 8;

/// Token alphabet: the 63 symbols of `[A-Za-z0-9_]`.
pub const TOKEN_ALPHABET: &[u8; 63] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{8}$").expect("token regex is valid"));

/// Short identifier that maps to a stored URL.
///
/// Always exactly [`TOKEN_LENGTH`] characters from `[A-Za-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UrlToken(String);

impl UrlToken {
    /// Validates a raw token string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] on field `token` unless `raw` is exactly
    /// eight characters from `[A-Za-z0-9_]`.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if !TOKEN_REGEX.is_match(raw) {
            return Err(AppError::validation(
                "token",
                format!("must be {TOKEN_LENGTH} characters of [A-Za-z0-9_]"),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Builds a token from bytes already known to be in [`TOKEN_ALPHABET`].
    pub(crate) fn from_alphabet(symbols: [u8; TOKEN_LENGTH]) -> Self {
        Self(symbols.iter().map(|&b| b as char).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UrlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UrlToken {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UrlToken> for String {
    fn from(token: UrlToken) -> Self {
        token.0
    }
}

/// A long URL as submitted by the caller.
///
/// Must parse as an absolute URL with a scheme and a non-empty host. The raw
/// string is kept verbatim and compared by exact equality: `https://a.com` and
/// `https://a.com/` are different entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LongUrl(String);

impl LongUrl {
    /// Validates a raw URL string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] on field `url` when the string is empty,
    /// contains whitespace or control characters, does not parse, or has no host.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if raw.is_empty() {
            return Err(AppError::validation("url", "url is empty"));
        }

        // The URL parser strips these silently, but the raw string is what gets stored.
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AppError::validation(
                "url",
                "url must not contain whitespace or control characters",
            ));
        }

        let parsed = url::Url::parse(raw)
            .map_err(|e| AppError::validation("url", format!("url is not valid: {e}")))?;

        if parsed.scheme().is_empty() || parsed.host_str().is_none_or(str::is_empty) {
            return Err(AppError::validation("url", "url must have a scheme and host"));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LongUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LongUrl {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LongUrl> for String {
    fn from(url: LongUrl) -> Self {
        url.0
    }
}

/// The `{url, token, visit_count}` aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    pub url: LongUrl,
    pub token: UrlToken,
    pub visit_count: u64,
}

impl UrlEntry {
    /// Creates an entry that has never been visited.
    pub fn new(url: LongUrl, token: UrlToken) -> Self {
        Self {
            url,
            token,
            visit_count: 0,
        }
    }
}

/// Result of a resolve-or-create save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedEntry {
    pub entry: UrlEntry,
    /// `false` when the URL was already mapped and the existing entry was returned.
    pub created: bool,
}

impl SavedEntry {
    pub fn created(entry: UrlEntry) -> Self {
        Self {
            entry,
            created: true,
        }
    }

    pub fn existing(entry: UrlEntry) -> Self {
        Self {
            entry,
            created: false,
        }
    }
}
