//! DTOs for the top domains endpoint.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::domain::entities::DomainCount;

pub const DEFAULT_TOP_DOMAINS: usize = 3;

/// Query parameters for `GET /api/metrics`.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MetricsQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, max = 100, message = "n must be between 1 and 100"))]
    pub n: Option<usize>,
}

impl MetricsQuery {
    pub fn limit(&self) -> usize {
        self.n.unwrap_or(DEFAULT_TOP_DOMAINS)
    }
}

#[derive(Debug, Serialize)]
pub struct DomainCountDto {
    pub domain: String,
    pub count: i64,
}

impl From<DomainCount> for DomainCountDto {
    fn from(value: DomainCount) -> Self {
        Self {
            domain: value.domain,
            count: value.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub domains: Vec<DomainCountDto>,
}
