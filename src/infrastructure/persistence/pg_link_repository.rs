//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{DomainCount, NewLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct LinkRow {
    code: String,
    long_url: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for ShortLink {
    fn from(row: LinkRow) -> Self {
        ShortLink::new(
            row.code,
            row.long_url,
            row.user_id,
            row.created_at,
            row.expires_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct DomainCountRow {
    domain: String,
    count: i64,
}

/// PostgreSQL repository for links and domain counts.
///
/// Conflicts are resolved inside single statements (`ON CONFLICT`), so
/// concurrent writers never need an explicit transaction.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn save(&self, new_link: NewLink) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO links (code, long_url, user_id, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.long_url)
        .bind(new_link.owner_id)
        .bind(new_link.expires_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_code(
        &self,
        long_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AppError> {
        let code = sqlx::query_scalar::<_, String>(
            r#"
            SELECT code
            FROM links
            WHERE long_url = $1
              AND (expires_at IS NULL OR expires_at > $2)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(long_url)
        .bind(now)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(code)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT code, long_url, user_id, created_at, expires_at
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<ShortLink>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT code, long_url, user_id, created_at, expires_at
            FROM links
            WHERE user_id = $1
            ORDER BY created_at DESC, code
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(ShortLink::from).collect())
    }

    async fn delete(&self, owner_id: i64, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM links
            WHERE code = $1 AND user_id = $2
            "#,
        )
        .bind(code)
        .bind(owner_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_domain_count(&self, owner_id: i64, domain: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO domain_counts (user_id, domain, count)
            VALUES ($1, $2, 1)
            ON CONFLICT (domain, user_id)
            DO UPDATE SET count = domain_counts.count + 1
            "#,
        )
        .bind(owner_id)
        .bind(domain)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn top_domains(
        &self,
        owner_id: i64,
        limit: i64,
    ) -> Result<Vec<DomainCount>, AppError> {
        let rows = sqlx::query_as::<_, DomainCountRow>(
            r#"
            SELECT domain, count
            FROM domain_counts
            WHERE user_id = $1
            ORDER BY count DESC, domain ASC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DomainCount::new(r.domain, r.count))
            .collect())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM links
            WHERE expires_at IS NOT NULL AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
