//! Data Transfer Objects for API requests and responses.
//!
//! Bodies carry raw strings; validation happens in the entry service so the
//! HTTP adapter and the seeder reject the same inputs.

pub mod entry;
pub mod health;
