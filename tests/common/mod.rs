#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::ServiceExt;
use axum::extract::Request;
use axum::routing::IntoMakeService;
use axum_test::TestServer;
use serde_json::Value;
use snaplink::domain::entities::{Link, NewLink};
use snaplink::domain::repositories::LinkRepository;
use snaplink::error::AppError;
use snaplink::infrastructure::persistence::InMemoryLinkRepository;
use snaplink::routes::app_router;
use snaplink::state::AppState;
use std::sync::Arc;
use tower_http::normalize_path::NormalizePath;

pub const BASE_URL: &str = "http://sho.rt";
pub const CODE_LENGTH: usize = 6;

/// Store whose every operation fails, for exercising 500/503 paths.
pub struct FailingLinkRepository;

#[async_trait]
impl LinkRepository for FailingLinkRepository {
    async fn create(&self, _new_link: NewLink) -> Result<Link, AppError> {
        Err(AppError::internal("Could not save URL", Value::Null))
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<Link>, AppError> {
        Err(AppError::internal("Database error", Value::Null))
    }

    async fn increment_clicks(&self, _code: &str) -> Result<Option<Link>, AppError> {
        Err(AppError::internal("Database error", Value::Null))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Err(AppError::internal("Database error", Value::Null))
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        Err(AppError::internal("Database error", Value::Null))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::internal("connection refused", Value::Null))
    }
}

pub fn create_test_state() -> (AppState, Arc<InMemoryLinkRepository>) {
    let repo = Arc::new(InMemoryLinkRepository::new());
    let state = AppState::new(repo.clone(), BASE_URL, CODE_LENGTH);
    (state, repo)
}

/// The production router, middleware included, as `server::run` serves it.
pub fn create_test_app(state: AppState) -> IntoMakeService<NormalizePath<Router>> {
    ServiceExt::<Request>::into_make_service(app_router(state))
}

/// Server over a fresh in-memory store, with every public route mounted.
pub fn create_test_server() -> (TestServer, Arc<InMemoryLinkRepository>) {
    let (state, repo) = create_test_state();
    let server = TestServer::new(create_test_app(state)).unwrap();
    (server, repo)
}

pub fn create_failing_server() -> TestServer {
    let state = AppState::new(Arc::new(FailingLinkRepository), BASE_URL, CODE_LENGTH);
    TestServer::new(create_test_app(state)).unwrap()
}

pub async fn create_test_link(repo: &InMemoryLinkRepository, code: &str, url: &str) -> Link {
    repo.create(NewLink::new(code, url)).await.unwrap()
}

/// Extracts the short code from a `short_url` returned by `POST /shorten`.
pub fn code_from_short_url(short_url: &str) -> String {
    short_url
        .strip_prefix(&format!("{}/", BASE_URL))
        .expect("short_url should start with the base URL")
        .to_string()
}
