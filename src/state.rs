//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::repositories::LinkRepository;

/// State shared by all request handlers.
///
/// Built once at startup from an explicitly constructed store; cloning is
/// cheap.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
}

impl AppState {
    /// Wires the link service over the given store.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        base_url: impl Into<String>,
        code_length: usize,
    ) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(link_repository, base_url, code_length)),
        }
    }
}
