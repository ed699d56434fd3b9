mod common;

use getsit::AppError;
use getsit::domain::entities::{LongUrl, UrlToken};
use getsit::domain::repositories::EntryRepository;
use getsit::infrastructure::persistence::PgEntryRepository;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;

fn url(raw: &str) -> LongUrl {
    LongUrl::parse(raw).unwrap()
}

#[sqlx::test]
async fn test_save_url_and_find(pool: PgPool) {
    let repo = PgEntryRepository::new(Arc::new(pool));

    let saved = repo.save_url(&url("https://example.com")).await.unwrap();

    assert!(saved.created);
    assert_eq!(saved.entry.visit_count, 0);

    let by_token = repo.find_by_token(&saved.entry.token).await.unwrap();
    let by_url = repo.find_by_url(&saved.entry.url).await.unwrap();
    assert_eq!(by_token, Some(saved.entry.clone()));
    assert_eq!(by_url, Some(saved.entry));
}

#[sqlx::test]
async fn test_save_url_is_idempotent(pool: PgPool) {
    let repo = PgEntryRepository::new(Arc::new(pool));

    let first = repo.save_url(&url("https://example.com/x")).await.unwrap();
    let second = repo.save_url(&url("https://example.com/x")).await.unwrap();

    assert!(!second.created);
    assert_eq!(first.entry.token, second.entry.token);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[sqlx::test]
async fn test_token_collision_is_retried(pool: PgPool) {
    let tokens = common::ScriptedTokens::new(&["aaaaaaaa", "aaaaaaaa", "bbbbbbbb"]);
    let repo = PgEntryRepository::with_token_source(Arc::new(pool), tokens);

    let first = repo.save_url(&url("https://one.com")).await.unwrap();
    let second = repo.save_url(&url("https://two.com")).await.unwrap();

    assert_eq!(first.entry.token.as_str(), "aaaaaaaa");
    assert_eq!(second.entry.token.as_str(), "bbbbbbbb");
}

#[sqlx::test]
async fn test_visits_increment(pool: PgPool) {
    let repo = PgEntryRepository::new(Arc::new(pool));
    let token = repo
        .save_url(&url("https://example.com/v"))
        .await
        .unwrap()
        .entry
        .token;

    for _ in 0..5 {
        repo.save_visit(&token).await.unwrap();
    }

    let entry = repo.find_by_token(&token).await.unwrap().unwrap();
    assert_eq!(entry.visit_count, 5);

    let missing = repo.save_visit(&UrlToken::parse("zzzzzzzz").unwrap()).await;
    assert!(matches!(missing, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_concurrent_visits_are_not_lost(pool: PgPool) {
    let repo = Arc::new(PgEntryRepository::new(Arc::new(pool)));
    let token = repo
        .save_url(&url("https://example.com/hot"))
        .await
        .unwrap()
        .entry
        .token;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..4 {
        let repo = repo.clone();
        let token = token.clone();
        tasks.spawn(async move {
            for _ in 0..25 {
                repo.save_visit(&token).await.unwrap();
            }
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    let entry = repo.find_by_token(&token).await.unwrap().unwrap();
    assert_eq!(entry.visit_count, 100);
}

#[sqlx::test]
async fn test_concurrent_saves_of_one_url(pool: PgPool) {
    let repo = Arc::new(PgEntryRepository::new(Arc::new(pool)));

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let repo = repo.clone();
        tasks.spawn(async move { repo.save_url(&url("https://race.com")).await.unwrap() });
    }

    let mut tokens = HashSet::new();
    while let Some(joined) = tasks.join_next().await {
        tokens.insert(joined.unwrap().entry.token);
    }

    assert_eq!(tokens.len(), 1);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[sqlx::test]
async fn test_truncate(pool: PgPool) {
    let repo = PgEntryRepository::new(Arc::new(pool));
    repo.save_url(&url("https://example.com/1")).await.unwrap();
    repo.save_url(&url("https://example.com/2")).await.unwrap();

    repo.truncate().await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 0);
}
