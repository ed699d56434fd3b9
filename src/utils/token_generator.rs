//! Short token generation.
//!
//! Tokens are eight symbols drawn independently from the 63-symbol alphabet `[A-Za-z0-9_]` using
//! the operating system's secure random source. Generation never consults a
//! store: uniqueness is the repository's job.

use crate::domain::entities::{TOKEN_ALPHABET, TOKEN_LENGTH, UrlToken};
use crate::error::AppError;
use serde_json::json;

/// Largest multiple of the alphabet size that fits in a byte; bytes at or above it are discarded.
const ACCEPT_BELOW: u8 = (256 / TOKEN_ALPHABET.len() * TOKEN_ALPHABET.len()) as u8;

/// Generates a random token from the OS random source.
///
/// Bytes are rejection-sampled: only bytes below [`ACCEPT_BELOW`] are kept and
/// reduced modulo the alphabet size, so every symbol is equally likely. The
/// buffer is refilled until eight symbols have been accepted.
///
/// There is no fallback generator: if the secure source fails the error is
/// returned to the caller.
///
/// # Errors
///
/// Returns [`AppError::Store`] if the system random number generator is unavailable.
///
/// # Examples
///
/// ```ignore
/// let token = generate_token()?;
/// assert_eq!(token.as_str().len(), 8);
/// ```
pub fn generate_token() -> Result<UrlToken, AppError> {
    let mut symbols = [0u8; TOKEN_LENGTH];
    let mut filled = 0;
    let mut buffer = [0u8; 2 * TOKEN_LENGTH];

    while filled < TOKEN_LENGTH {
        getrandom::fill(&mut buffer).map_err(|e| {
            AppError::store(
                "Secure random source unavailable",
                json!({ "reason": e.to_string() }),
            )
        })?;

        for &b in buffer.iter().filter(|&&b| b < ACCEPT_BELOW) {
            if filled == TOKEN_LENGTH {
                break;
            }
            symbols[filled] = TOKEN_ALPHABET[usize::from(b) % TOKEN_ALPHABET.len()];
            filled += 1;
        }
    }

    Ok(UrlToken::from_alphabet(symbols))
}

/// Source of candidate tokens for a repository.
///
/// Repositories draw candidates from a source and retry on collision, so a
/// source only has to produce well-formed tokens, not unique ones.
pub trait TokenSource: Send + Sync {
    fn next_token(&self) -> Result<UrlToken, AppError>;
}

/// Default source backed by [`generate_token`].
#[derive(Debug, Default, Clone, Copy)]
pub struct OsTokenSource;

impl TokenSource for OsTokenSource {
    fn next_token(&self) -> Result<UrlToken, AppError> {
        generate_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_generate_token_has_correct_length() {
        let token = generate_token().unwrap();
        assert_eq!(token.as_str().len(), TOKEN_LENGTH);
    }

    #[test]
    fn test_generate_token_passes_validation() {
        for _ in 0..100 {
            let token = generate_token().unwrap();
            assert!(UrlToken::parse(token.as_str()).is_ok());
        }
    }

    #[test]
    fn test_generate_token_produces_unique_tokens() {
        let tokens: HashSet<_> = (0..1000).map(|_| generate_token().unwrap()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_generate_token_covers_alphabet() {
        let mut seen: HashMap<char, usize> = HashMap::new();
        for _ in 0..2000 {
            for c in generate_token().unwrap().as_str().chars() {
                *seen.entry(c).or_default() += 1;
            }
        }

        // 16000 draws over 63 symbols: every symbol turns up.
        assert_eq!(seen.len(), TOKEN_ALPHABET.len());
        assert!(seen.contains_key(&'_'));
    }

    #[test]
    fn test_accept_bound_is_multiple_of_alphabet() {
        assert_eq!(ACCEPT_BELOW, 252);
        assert_eq!(usize::from(ACCEPT_BELOW) % TOKEN_ALPHABET.len(), 0);
    }

    #[test]
    fn test_generate_token_is_roughly_uniform() {
        const TOKENS: usize = 20_000;

        let mut counts: HashMap<char, usize> = HashMap::new();
        for _ in 0..TOKENS {
            for c in generate_token().unwrap().as_str().chars() {
                *counts.entry(c).or_default() += 1;
            }
        }

        // 160000 draws, about 2540 per symbol; a biased symbol would sit far outside this band.
        let expected = (TOKENS * TOKEN_LENGTH) / TOKEN_ALPHABET.len();
        assert_eq!(counts.len(), TOKEN_ALPHABET.len());
        for (symbol, count) in counts {
            assert!(
                count > expected * 8 / 10 && count < expected * 12 / 10,
                "symbol {symbol:?} drawn {count} times, expected about {expected}"
            );
        }
    }

    #[test]
    fn test_os_source_delegates_to_generator() {
        let token = OsTokenSource.next_token().unwrap();
        assert_eq!(token.as_str().len(), TOKEN_LENGTH);
    }
}
