//! Repository trait definitions for the domain layer.
//!
//! [`EntryRepository`] is the store contract shared by every backend. The trait
//! lives here; implementations live in `crate::infrastructure::persistence`.
//! Mock implementations are generated via `mockall` for unit tests.
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod entry_repository;

pub use entry_repository::{EntryRepository, MAX_TOKEN_ATTEMPTS};

#[cfg(test)]
pub use entry_repository::MockEntryRepository;
