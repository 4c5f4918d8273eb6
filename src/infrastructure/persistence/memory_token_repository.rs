//! In-process implementation of token repository.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::clock::Clock;
use crate::domain::entities::ApiToken;
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;

/// Token storage in a process-local list.
///
/// Used by the test suite and for local runs without PostgreSQL.
pub struct MemoryTokenRepository {
    tokens: RwLock<Vec<ApiToken>>,
    clock: Arc<dyn Clock>,
}

impl MemoryTokenRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: RwLock::new(Vec::new()),
            clock,
        }
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn find_user_id(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .iter()
            .find(|t| t.token_hash == token_hash && !t.is_revoked())
            .map(|t| t.user_id))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let now = self.clock.now();
        let mut tokens = self.tokens.write().await;
        if let Some(token) = tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash && !t.is_revoked())
        {
            token.last_used_at = Some(now);
        }
        Ok(())
    }

    async fn create_token(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let mut tokens = self.tokens.write().await;
        if tokens.iter().any(|t| t.token_hash == token_hash) {
            return Err(AppError::conflict(
                "Token already exists",
                json!({ "name": name }),
            ));
        }

        let token = ApiToken {
            id: tokens.len() as i64 + 1,
            user_id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: self.clock.now(),
            last_used_at: None,
            revoked_at: None,
        };
        tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let mut tokens = self.tokens.read().await.clone();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tokens)
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let now = self.clock.now();
        let mut tokens = self.tokens.write().await;
        match tokens.iter_mut().find(|t| t.id == id && !t.is_revoked()) {
            Some(token) => {
                token.revoked_at = Some(now);
                Ok(())
            }
            None => Err(AppError::not_found(
                "Token not found or already revoked",
                json!({ "id": id }),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::MockClock;
    use chrono::{TimeZone, Utc};

    fn repo() -> MemoryTokenRepository {
        let clock = MockClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        MemoryTokenRepository::new(Arc::new(clock))
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = repo();
        let token = repo.create_token(42, "ci", "hash-1").await.unwrap();
        assert_eq!(token.user_id, 42);
        assert_eq!(repo.find_user_id("hash-1").await.unwrap(), Some(42));
        assert_eq!(repo.find_user_id("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_hash_conflicts() {
        let repo = repo();
        repo.create_token(1, "a", "same").await.unwrap();
        let err = repo.create_token(2, "b", "same").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_revoked_token_no_longer_resolves() {
        let repo = repo();
        let token = repo.create_token(1, "a", "h").await.unwrap();
        repo.revoke_token(token.id).await.unwrap();

        assert_eq!(repo.find_user_id("h").await.unwrap(), None);
        assert!(repo.revoke_token(token.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_last_used() {
        let repo = repo();
        repo.create_token(1, "a", "h").await.unwrap();
        repo.update_last_used("h").await.unwrap();

        let tokens = repo.list_tokens().await.unwrap();
        assert!(tokens[0].last_used_at.is_some());
    }
}
