//! Per-owner domain counter used for "top domains" metrics.

use serde::{Deserialize, Serialize};

/// Number of times an owner has shortened URLs on a given domain.
///
/// `domain` is the lower-cased host with any leading `www.` removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: i64,
}

impl DomainCount {
    pub fn new(domain: impl Into<String>, count: i64) -> Self {
        Self {
            domain: domain.into(),
            count,
        }
    }
}

/// Orders counts by `count` descending, then `domain` ascending.
///
/// Both repository variants return rows in this order so results are stable
/// across backends.
pub fn sort_top_domains(items: &mut [DomainCount]) {
    items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.domain.cmp(&b.domain)));
}
