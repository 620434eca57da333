//! DTOs for link statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Link;

/// Click statistics for a specific short link.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub original_url: String,
    pub short_code: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for StatsResponse {
    fn from(link: Link) -> Self {
        Self {
            original_url: link.original_url,
            short_code: link.short_code,
            clicks: link.clicks,
            created_at: link.created_at,
        }
    }
}
