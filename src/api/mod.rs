//! JSON HTTP adapter over the entry service.
//!
//! # Modules
//!
//! - [`dto`] - request and response bodies
//! - [`handlers`] - one async function per endpoint
//! - [`middleware`] - request tracing
//! - [`routes`] - route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
