//! HTTP request handlers for API endpoints.

pub mod entries;
pub mod health;
pub mod redirect;

pub use entries::{create_entry_handler, entry_by_url_handler, get_entry_handler};
pub use health::health_handler;
pub use redirect::redirect_handler;
