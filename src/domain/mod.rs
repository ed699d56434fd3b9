//! Domain layer containing the entry aggregate and the store contract.
//!
//! # Architecture
//!
//! - [`entities`] - Url entry aggregate and its value objects
//! - [`repositories`] - The [`repositories::EntryRepository`] store contract
//!
//! The domain layer has no dependency on a particular backend. Concrete stores
//! live in [`crate::infrastructure::persistence`].

pub mod entities;
pub mod repositories;
