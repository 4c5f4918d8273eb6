//! PostgreSQL link repository tests. Run with `cargo test -- --ignored`
//! against a database reachable through `DATABASE_URL`.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use hyperlink::domain::entities::{DomainCount, NewLink};
use hyperlink::domain::repositories::LinkRepository;
use hyperlink::infrastructure::persistence::PgLinkRepository;

fn new_link(code: &str, url: &str, owner_id: i64) -> NewLink {
    NewLink {
        code: code.to_string(),
        long_url: url.to_string(),
        owner_id,
        expires_at: None,
    }
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_save_and_find(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.save(new_link("abc", "https://a.com", 42)).await.unwrap());

    let link = repo.find_by_code("abc").await.unwrap().unwrap();
    assert_eq!(link.long_url, "https://a.com");
    assert_eq!(link.owner_id, 42);
    assert_eq!(link.expires_at, None);
    assert_eq!(
        repo.get_code("https://a.com", Utc::now()).await.unwrap(),
        Some("abc".to_string())
    );
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_get_code_skips_expired_copies(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    let now = Utc::now();

    repo.save(NewLink {
        expires_at: Some(now - Duration::hours(1)),
        ..new_link("gone", "https://a.com", 1)
    })
    .await
    .unwrap();
    assert!(repo.get_code("https://a.com", now).await.unwrap().is_none());

    repo.save(new_link("live", "https://a.com", 2)).await.unwrap();
    assert_eq!(
        repo.get_code("https://a.com", now).await.unwrap(),
        Some("live".to_string())
    );
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_save_ignores_taken_code(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.save(new_link("abc", "https://a.com", 1)).await.unwrap());
    assert!(!repo.save(new_link("abc", "https://b.com", 2)).await.unwrap());

    let link = repo.find_by_code("abc").await.unwrap().unwrap();
    assert_eq!(link.long_url, "https://a.com");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_find_missing(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.find_by_code("nope").await.unwrap().is_none());
    assert!(repo.get_code("https://nope.com", Utc::now()).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_list_and_delete_by_owner(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.save(new_link("a1", "https://a.com/1", 1)).await.unwrap();
    repo.save(new_link("a2", "https://a.com/2", 1)).await.unwrap();
    repo.save(new_link("b1", "https://b.com/1", 2)).await.unwrap();

    assert_eq!(repo.list_by_owner(1).await.unwrap().len(), 2);

    assert!(!repo.delete(2, "a1").await.unwrap());
    assert!(repo.delete(1, "a1").await.unwrap());
    assert!(!repo.delete(1, "a1").await.unwrap());
    assert_eq!(repo.list_by_owner(1).await.unwrap().len(), 1);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_domain_counts(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    for domain in ["example.com", "rust-lang.org", "example.com", "docs.rs"] {
        repo.increment_domain_count(7, domain).await.unwrap();
    }
    repo.increment_domain_count(8, "other.org").await.unwrap();

    assert_eq!(
        repo.top_domains(7, 2).await.unwrap(),
        vec![
            DomainCount::new("example.com", 2),
            DomainCount::new("docs.rs", 1),
        ]
    );
    assert!(repo.top_domains(9, 3).await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_purge_expired(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    let now = Utc::now();

    let mut expired = new_link("old", "https://old.com", 1);
    expired.expires_at = Some(now - Duration::hours(1));
    let mut live = new_link("new", "https://new.com", 1);
    live.expires_at = Some(now + Duration::hours(1));
    repo.save(expired).await.unwrap();
    repo.save(live).await.unwrap();
    repo.save(new_link("forever", "https://forever.com", 1))
        .await
        .unwrap();

    assert_eq!(repo.purge_expired(now).await.unwrap(), 1);
    assert!(repo.find_by_code("old").await.unwrap().is_none());
    assert!(repo.find_by_code("new").await.unwrap().is_some());
    assert!(repo.find_by_code("forever").await.unwrap().is_some());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_health_check(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    assert!(repo.health_check().await);
}
