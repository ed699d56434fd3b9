#![allow(dead_code)]

use getsit::AppError;
use getsit::application::services::EntryService;
use getsit::domain::entities::UrlToken;
use getsit::domain::repositories::EntryRepository;
use getsit::infrastructure::persistence::MemoryEntryRepository;
use getsit::state::AppState;
use getsit::utils::token_generator::TokenSource;
use parking_lot::Mutex;
use std::sync::Arc;

/// Hands out a fixed sequence of tokens.
pub struct ScriptedTokens(Mutex<Vec<&'static str>>);

impl ScriptedTokens {
    pub fn new(tokens: &[&'static str]) -> Arc<Self> {
        Arc::new(Self(Mutex::new(tokens.to_vec())))
    }
}

impl TokenSource for ScriptedTokens {
    fn next_token(&self) -> Result<UrlToken, AppError> {
        let next = self.0.lock().remove(0);
        UrlToken::parse(next)
    }
}

pub fn memory_repository() -> Arc<dyn EntryRepository> {
    Arc::new(MemoryEntryRepository::new())
}

pub fn memory_service() -> Arc<EntryService<dyn EntryRepository>> {
    Arc::new(EntryService::new(memory_repository()))
}

pub fn memory_state() -> AppState {
    AppState::new(memory_repository())
}

/// `count` distinct URLs under one host.
pub fn distinct_urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://example.com/page/{i}"))
        .collect()
}
