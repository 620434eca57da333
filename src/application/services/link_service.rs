//! Link creation, lookup and click counting.

use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenError, generate_code, is_reserved_code};
use serde_json::{Value, json};

/// Maximum number of codes tried before giving up on a create.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Produces a candidate short code of the requested length.
pub type CodeSource = fn(usize) -> Result<String, CodeGenError>;

/// Service for creating and resolving shortened links.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    base_url: String,
    code_length: usize,
    code_source: CodeSource,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `base_url` is the public prefix of short URLs; a trailing `/` is ignored.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        base_url: impl Into<String>,
        code_length: usize,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            link_repository,
            base_url,
            code_length,
            code_source: generate_code,
        }
    }

    /// Replaces the random code generator.
    pub fn with_code_source(mut self, code_source: CodeSource) -> Self {
        self.code_source = code_source;
        self
    }

    /// Creates a short link for `original_url`.
    ///
    /// The URL is stored exactly as given. A fresh random code is generated;
    /// if it names a static route or the store reports it as taken, a new one
    /// is drawn, up to [`MAX_CODE_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is empty.
    /// Returns [`AppError::Internal`] if the random source fails, the store
    /// fails, or every attempted code collided.
    pub async fn create_short_link(&self, original_url: String) -> Result<Link, AppError> {
        if original_url.is_empty() {
            return Err(AppError::bad_request(
                "Invalid request",
                json!({ "fields": ["url"] }),
            ));
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = (self.code_source)(self.code_length)?;
            if is_reserved_code(&code) {
                tracing::warn!(attempt, code = %code, "Reserved short code drawn, regenerating");
                continue;
            }

            match self
                .link_repository
                .create(NewLink::new(code, original_url.clone()))
                .await
            {
                Ok(link) => {
                    tracing::info!(code = %link.short_code, "Short link created");
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) => {
                    tracing::warn!(attempt, "Short code collision, regenerating");
                }
                Err(AppError::Internal { details, .. }) => {
                    return Err(AppError::internal("Could not save URL", details));
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Could not save URL",
            json!({ "reason": "Too many code collisions" }),
        ))
    }

    /// Retrieves a link by its short code without side effects.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn get_link_by_code(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(url_not_found)
    }

    /// Counts one click on `code` and returns the updated link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn record_click(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .increment_clicks(code)
            .await?
            .ok_or_else(url_not_found)
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    /// Checks that the link store is reachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }
}

fn url_not_found() -> AppError {
    AppError::not_found("URL not found", Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::utils::code_generator::is_valid_code;
    use chrono::Utc;
    use mockall::Sequence;

    fn create_test_link(id: i64, code: &str, url: &str, clicks: i64) -> Link {
        Link::new(id, code.to_string(), url.to_string(), clicks, Utc::now())
    }

    fn service(repo: MockLinkRepository) -> LinkService {
        LinkService::new(Arc::new(repo), "https://s.example.com", 6)
    }

    #[tokio::test]
    async fn test_create_short_link_success() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_create()
            .withf(|new_link| {
                is_valid_code(&new_link.short_code, 6)
                    && new_link.original_url == "https://example.com"
            })
            .times(1)
            .returning(|new_link| {
                Ok(create_test_link(
                    10,
                    &new_link.short_code,
                    &new_link.original_url,
                    0,
                ))
            });

        let link = service(mock_link_repo)
            .create_short_link("https://example.com".to_string())
            .await
            .unwrap();

        assert_eq!(link.original_url, "https://example.com");
        assert_eq!(link.clicks, 0);
        assert_eq!(link.short_code.len(), 6);
    }

    #[tokio::test]
    async fn test_create_short_link_keeps_url_verbatim() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_create()
            .withf(|new_link| new_link.original_url == "HTTPS://Example.COM:443/Path#frag")
            .times(1)
            .returning(|new_link| {
                Ok(create_test_link(
                    1,
                    &new_link.short_code,
                    &new_link.original_url,
                    0,
                ))
            });

        let result = service(mock_link_repo)
            .create_short_link("HTTPS://Example.COM:443/Path#frag".to_string())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_short_link_empty_url() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo.expect_create().times(0);

        let result = service(mock_link_repo)
            .create_short_link(String::new())
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_short_link_retries_on_collision() {
        let mut mock_link_repo = MockLinkRepository::new();
        let mut seq = Sequence::new();

        mock_link_repo
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", Value::Null)));

        mock_link_repo
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_link| {
                Ok(create_test_link(
                    2,
                    &new_link.short_code,
                    &new_link.original_url,
                    0,
                ))
            });

        let result = service(mock_link_repo)
            .create_short_link("https://example.com".to_string())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_short_link_skips_reserved_code() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static DRAWS: AtomicUsize = AtomicUsize::new(0);

        fn health_then_abc(_length: usize) -> Result<String, CodeGenError> {
            match DRAWS.fetch_add(1, Ordering::SeqCst) {
                0 => Ok("health".to_string()),
                _ => Ok("abc123".to_string()),
            }
        }

        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_create()
            .withf(|new_link| new_link.short_code == "abc123")
            .times(1)
            .returning(|new_link| {
                Ok(create_test_link(
                    3,
                    &new_link.short_code,
                    &new_link.original_url,
                    0,
                ))
            });

        let link = service(mock_link_repo)
            .with_code_source(health_then_abc)
            .create_short_link("https://example.com".to_string())
            .await
            .unwrap();

        assert_eq!(link.short_code, "abc123");
        assert_eq!(DRAWS.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_short_link_only_reserved_codes() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo.expect_create().times(0);

        let result = service(mock_link_repo)
            .with_code_source(|_| Ok("shorten".to_string()))
            .create_short_link("https://example.com".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_create_short_link_gives_up_after_max_attempts() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_create()
            .times(MAX_CODE_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", Value::Null)));

        let result = service(mock_link_repo)
            .create_short_link("https://example.com".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_create_short_link_persistence_error_is_not_retried() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_create()
            .times(1)
            .returning(|_| Err(AppError::internal("Could not save URL", Value::Null)));

        let result = service(mock_link_repo)
            .create_short_link("https://example.com".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_get_link_by_code_not_found() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_find_by_code()
            .withf(|code| code == "missing")
            .times(1)
            .returning(|_| Ok(None));

        let result = service(mock_link_repo).get_link_by_code("missing").await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.to_string(), "URL not found");
    }

    #[tokio::test]
    async fn test_record_click_returns_updated_link() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_increment_clicks()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(Some(create_test_link(1, "abc123", "https://example.com", 3))));

        let link = service(mock_link_repo)
            .record_click("abc123")
            .await
            .unwrap();

        assert_eq!(link.clicks, 3);
    }

    #[tokio::test]
    async fn test_record_click_unknown_code() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(mock_link_repo).record_click("nope").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let service = LinkService::new(
            Arc::new(MockLinkRepository::new()),
            "http://localhost:8082/",
            6,
        );

        assert_eq!(service.short_url("abc123"), "http://localhost:8082/abc123");
    }
}
