//! Application layer.
//!
//! Coordinates repository calls behind a small API that the HTTP handlers and
//! the seeder binary share.
//!
//! - [`services::entry_service::EntryService`] - url entry creation, lookup and visits
//! - [`seeder`] - concurrent bulk population with progress reporting

pub mod seeder;
pub mod services;
