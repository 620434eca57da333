//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Process-local link store backed by a `DashMap`.
///
/// Mirrors the PostgreSQL semantics: codes are unique and click increments
/// happen under the shard lock, so they are exact under contention. Contents
/// are lost when the process exits.
#[derive(Debug)]
pub struct InMemoryLinkRepository {
    links: DashMap<String, Link>,
    next_id: AtomicI64,
}

impl InMemoryLinkRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl Default for InMemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        match self.links.entry(new_link.short_code.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "links_short_code_key" }),
            )),
            Entry::Vacant(slot) => {
                let link = Link::new(
                    self.next_id.fetch_add(1, Ordering::Relaxed),
                    new_link.short_code,
                    new_link.original_url,
                    0,
                    Utc::now(),
                );
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.get(code).map(|link| link.value().clone()))
    }

    async fn increment_clicks(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.get_mut(code).map(|mut link| {
            link.clicks += 1;
            link.value().clone()
        }))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.links.len() as i64)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        Ok(self.links.iter().map(|link| link.clicks).sum())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
