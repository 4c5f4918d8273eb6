//! PostgreSQL token repository tests. Run with `cargo test -- --ignored`.

use sqlx::PgPool;
use std::sync::Arc;

use hyperlink::domain::repositories::TokenRepository;
use hyperlink::error::AppError;
use hyperlink::infrastructure::persistence::PgTokenRepository;

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create_token(5, "test-token", "hash123").await.unwrap();

    assert_eq!(token.user_id, 5);
    assert_eq!(token.name, "test-token");
    assert_eq!(token.token_hash, "hash123");
    assert!(!token.is_revoked());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_hash_conflicts(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token(1, "first", "samehash").await.unwrap();
    let result = repo.create_token(2, "second", "samehash").await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_find_user_id(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    repo.create_token(9, "valid-token", "validhash").await.unwrap();

    assert_eq!(repo.find_user_id("validhash").await.unwrap(), Some(9));
    assert_eq!(repo.find_user_id("nonexistent").await.unwrap(), None);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_revoked_token_is_not_found(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let token = repo
        .create_token(1, "revoked-token", "revokedhash")
        .await
        .unwrap();

    repo.revoke_token(token.id).await.unwrap();

    assert_eq!(repo.find_user_id("revokedhash").await.unwrap(), None);
    assert!(matches!(
        repo.revoke_token(token.id).await,
        Err(AppError::NotFound { .. })
    ));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_last_used(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    repo.create_token(1, "used-token", "usedhash").await.unwrap();

    repo.update_last_used("usedhash").await.unwrap();

    let tokens = repo.list_tokens().await.unwrap();
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].last_used_at.is_some());
}
