//! Utility functions shared across layers.
//!
//! - [`token_generator`] - Secure random token generation

pub mod token_generator;
