//! Common test utilities for in-process API testing with mocks.
//!
//! This module provides a test fixture that builds the real router over a
//! scripted page transport, so no external site is contacted.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use hashistream_core::{testing::MockFetcher, Config, PageRange};
use hashistream_server::state::AppState;

/// Re-export fixtures for test convenience
pub use hashistream_core::testing::fixtures;

pub const PRIMARY: &str = "https://primary.test";
pub const SECONDARY: &str = "https://secondary.test";

/// Test fixture for API testing with a mock transport.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_movies() {
///     let fixture = TestFixture::new();
///     fixture.listing_page(1, &[("Film", "https://primary.test/film/")]).await;
///
///     let response = fixture.get("/api/movies").await;
///
///     assert_eq!(response.body["count"], 1);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared application state behind the router
    pub state: Arc<AppState>,
    /// Mock transport - script pages and failures
    pub mock: Arc<MockFetcher>,
    /// Static front-end directory
    pub static_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default settings.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test fixture, adjusting the config before wiring.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let static_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(
            static_dir.path().join("index.html"),
            "<html><body>hashistream</body></html>",
        )
        .expect("Failed to write index.html");
        std::fs::write(static_dir.path().join("app.js"), "console.log('app');")
            .expect("Failed to write app.js");

        let mut config = Config::default();
        config.server.static_dir = static_dir.path().to_path_buf();
        config.snapshot.load_on_start = false;
        config.fetcher.backoff_base_ms = 1;
        config.listing.base_url = PRIMARY.to_string();
        config.listing.background_pages = PageRange::new(3, 3);
        config.sitemap.sitemap_url = format!("{}/sitemap.xml?page={{page}}", SECONDARY);
        config.sitemap.pages = PageRange::new(1, 1);
        config.scan.batch_delay_ms = 0;
        adjust(&mut config);

        let mock = Arc::new(MockFetcher::new());
        let state = Arc::new(
            AppState::from_config(config, mock.clone()).expect("Failed to create app state"),
        );
        let router = hashistream_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            mock,
            static_dir,
        }
    }

    /// Serve a listing page with the given cards.
    pub async fn listing_page(&self, page: u32, cards: &[(&str, &str)]) {
        self.mock
            .set_page(
                self.state.config().listing.page_url(page),
                fixtures::listing_page(cards),
            )
            .await;
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }
}
