use getsit::domain::entities::{LongUrl, UrlToken};
use getsit::domain::repositories::EntryRepository;
use getsit::infrastructure::persistence::MemoryEntryRepository;
use std::collections::HashSet;
use std::sync::Arc;

fn url(raw: &str) -> LongUrl {
    LongUrl::parse(raw).unwrap()
}

#[tokio::test]
async fn test_save_url_creates_entry() {
    let repo = MemoryEntryRepository::new();

    let saved = repo.save_url(&url("https://example.com")).await.unwrap();

    assert!(saved.created);
    assert_eq!(saved.entry.url.as_str(), "https://example.com");
    assert_eq!(saved.entry.token.as_str().len(), 8);
    assert_eq!(saved.entry.visit_count, 0);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_distinct_urls_get_distinct_tokens() {
    let repo = MemoryEntryRepository::new();

    let mut tokens = HashSet::new();
    for i in 0..500 {
        let saved = repo
            .save_url(&url(&format!("https://example.com/{i}")))
            .await
            .unwrap();
        assert!(saved.created);
        tokens.insert(saved.entry.token);
    }

    assert_eq!(tokens.len(), 500);
    assert_eq!(repo.count().await.unwrap(), 500);
}

#[tokio::test]
async fn test_save_url_is_idempotent() {
    let repo = MemoryEntryRepository::new();
    let target = url("https://example.com/same");

    let first = repo.save_url(&target).await.unwrap();
    repo.save_visit(&first.entry.token).await.unwrap();
    let second = repo.save_url(&target).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.entry.token, second.entry.token);
    assert_eq!(second.entry.visit_count, 1);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_urls_are_compared_exactly() {
    let repo = MemoryEntryRepository::new();

    let bare = repo.save_url(&url("https://a.com")).await.unwrap();
    let slash = repo.save_url(&url("https://a.com/")).await.unwrap();

    assert!(slash.created);
    assert_ne!(bare.entry.token, slash.entry.token);
}

#[tokio::test]
async fn test_find_by_token_round_trip() {
    let repo = MemoryEntryRepository::new();
    let saved = repo.save_url(&url("https://example.com/a")).await.unwrap();

    let found = repo.find_by_token(&saved.entry.token).await.unwrap();

    assert_eq!(found, Some(saved.entry));
}

#[tokio::test]
async fn test_find_by_url_and_token_agree() {
    let repo = MemoryEntryRepository::new();
    let saved = repo.save_url(&url("https://example.com/b")).await.unwrap();

    let by_url = repo.find_by_url(&saved.entry.url).await.unwrap().unwrap();
    let by_token = repo
        .find_by_token(&saved.entry.token)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(by_url, by_token);
}

#[tokio::test]
async fn test_find_missing_returns_none() {
    let repo = MemoryEntryRepository::new();

    let token = UrlToken::parse("aaaaaaaa").unwrap();
    assert!(repo.find_by_token(&token).await.unwrap().is_none());
    assert!(
        repo.find_by_url(&url("https://missing.com"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_sequential_visits_are_counted() {
    let repo = MemoryEntryRepository::new();
    let saved = repo.save_url(&url("https://example.com/c")).await.unwrap();

    for _ in 0..25 {
        repo.save_visit(&saved.entry.token).await.unwrap();
    }

    let entry = repo
        .find_by_token(&saved.entry.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.visit_count, 25);
}

#[tokio::test]
async fn test_save_visit_unknown_token_is_not_found() {
    let repo = MemoryEntryRepository::new();

    let result = repo.save_visit(&UrlToken::parse("aaaaaaaa").unwrap()).await;

    assert!(matches!(result, Err(getsit::AppError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_visits_are_not_lost() {
    const WORKERS: usize = 8;
    const VISITS: usize = 250;

    let repo = Arc::new(MemoryEntryRepository::new());
    let token = repo
        .save_url(&url("https://example.com/hot"))
        .await
        .unwrap()
        .entry
        .token;

    let mut handles = Vec::new();
    for _ in 0..WORKERS {
        let repo = repo.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..VISITS {
                repo.save_visit(&token).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let entry = repo.find_by_token(&token).await.unwrap().unwrap();
    assert_eq!(entry.visit_count, (WORKERS * VISITS) as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_of_one_url_share_a_token() {
    let repo = Arc::new(MemoryEntryRepository::new());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.save_url(&url("https://example.com/race"))
                .await
                .unwrap()
        }));
    }

    let mut tokens = HashSet::new();
    let mut created = 0;
    for handle in handles {
        let saved = handle.await.unwrap();
        created += usize::from(saved.created);
        tokens.insert(saved.entry.token);
    }

    assert_eq!(created, 1);
    assert_eq!(tokens.len(), 1);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_truncate_clears_both_indexes() {
    let repo = MemoryEntryRepository::new();
    let saved = repo.save_url(&url("https://example.com/d")).await.unwrap();

    repo.truncate().await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 0);
    assert!(
        repo.find_by_token(&saved.entry.token)
            .await
            .unwrap()
            .is_none()
    );
    assert!(repo.find_by_url(&saved.entry.url).await.unwrap().is_none());
}
