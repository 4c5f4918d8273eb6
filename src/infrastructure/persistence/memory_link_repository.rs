//! In-process implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::clock::Clock;
use crate::domain::entities::{DomainCount, NewLink, ShortLink, sort_top_domains};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(Default)]
struct LinkTable {
    by_code: HashMap<String, ShortLink>,
    /// Codes per URL, oldest first.
    by_url: HashMap<String, Vec<String>>,
}

impl LinkTable {
    fn remove(&mut self, code: &str) -> Option<ShortLink> {
        let link = self.by_code.remove(code)?;
        if let Some(codes) = self.by_url.get_mut(&link.long_url) {
            codes.retain(|c| c != code);
            if codes.is_empty() {
                self.by_url.remove(&link.long_url);
            }
        }
        Some(link)
    }

    fn newest_live(&self, long_url: &str, now: DateTime<Utc>) -> Option<&ShortLink> {
        self.by_url
            .get(long_url)?
            .iter()
            .rev()
            .filter_map(|code| self.by_code.get(code))
            .find(|link| !link.is_expired_at(now))
    }
}

/// Link storage in process-local maps.
///
/// Links and domain counts sit behind separate reader/writer locks, so
/// metrics writes never block redirect reads.
pub struct MemoryLinkRepository {
    links: RwLock<LinkTable>,
    domain_counts: RwLock<HashMap<(i64, String), i64>>,
    clock: Arc<dyn Clock>,
}

impl MemoryLinkRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            links: RwLock::new(LinkTable::default()),
            domain_counts: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn save(&self, new_link: NewLink) -> Result<bool, AppError> {
        let mut table = self.links.write().await;
        if table.by_code.contains_key(&new_link.code) {
            return Ok(false);
        }

        let link = ShortLink::new(
            new_link.code,
            new_link.long_url,
            new_link.owner_id,
            self.clock.now(),
            new_link.expires_at,
        );
        table
            .by_url
            .entry(link.long_url.clone())
            .or_default()
            .push(link.code.clone());
        table.by_code.insert(link.code.clone(), link);
        Ok(true)
    }

    async fn get_code(
        &self,
        long_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AppError> {
        let table = self.links.read().await;
        Ok(table.newest_live(long_url, now).map(|l| l.code.clone()))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.links.read().await.by_code.get(code).cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<ShortLink>, AppError> {
        let table = self.links.read().await;
        let mut links: Vec<ShortLink> = table
            .by_code
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });
        Ok(links)
    }

    async fn delete(&self, owner_id: i64, code: &str) -> Result<bool, AppError> {
        let mut table = self.links.write().await;
        match table.by_code.get(code) {
            Some(link) if link.owner_id == owner_id => {
                table.remove(code);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_domain_count(&self, owner_id: i64, domain: &str) -> Result<(), AppError> {
        let mut counts = self.domain_counts.write().await;
        *counts.entry((owner_id, domain.to_string())).or_insert(0) += 1;
        Ok(())
    }

    async fn top_domains(
        &self,
        owner_id: i64,
        limit: i64,
    ) -> Result<Vec<DomainCount>, AppError> {
        let counts = self.domain_counts.read().await;
        let mut items: Vec<DomainCount> = counts
            .iter()
            .filter(|((owner, _), _)| *owner == owner_id)
            .map(|((_, domain), count)| DomainCount::new(domain.clone(), *count))
            .collect();
        sort_top_domains(&mut items);
        items.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(items)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut table = self.links.write().await;
        let expired: Vec<String> = table
            .by_code
            .values()
            .filter(|l| l.is_expired_at(now))
            .map(|l| l.code.clone())
            .collect();
        for code in &expired {
            table.remove(code);
        }
        Ok(expired.len() as u64)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
