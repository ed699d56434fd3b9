//! Entry repository implementations.
//!
//! # Repositories
//!
//! - [`MemoryEntryRepository`] - Two index maps behind a single lock
//! - [`PgEntryRepository`] - PostgreSQL table with unique constraints
//! - [`MongoEntryRepository`] - MongoDB collection with a unique url index
//!
//! [`connect_repository`] picks one based on [`crate::config::Config`].

pub mod connect;
pub mod memory_entry_repository;
pub mod mongo_entry_repository;
pub mod pg_entry_repository;

pub use connect::connect_repository;
pub use memory_entry_repository::MemoryEntryRepository;
pub use mongo_entry_repository::MongoEntryRepository;
pub use pg_entry_repository::PgEntryRepository;
