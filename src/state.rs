use std::sync::Arc;

use crate::application::services::EntryService;
use crate::domain::repositories::EntryRepository;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub entry_service: Arc<EntryService<dyn EntryRepository>>,
}

impl AppState {
    pub fn new(repository: Arc<dyn EntryRepository>) -> Self {
        Self {
            entry_service: Arc::new(EntryService::new(repository)),
        }
    }
}
