//! Integration test support for the Drip Supply storefront.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`;
//! no socket is bound. Each [`TestContext`] owns a temporary data directory so
//! cart persistence is exercised through the same file storage the binary uses.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::path::{Path, PathBuf};

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use drip_storefront::cart::FileStorage;
use drip_storefront::catalog::Catalog;
use drip_storefront::routes;
use drip_storefront::state::AppState;
use tempfile::TempDir;
use tower::ServiceExt;

/// A running (in-process) storefront.
pub struct TestContext {
    pub state: AppState,
    router: Router,
    data_dir: PathBuf,
    _tmp: Option<TempDir>,
}

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

impl TestContext {
    /// Storefront with the built-in catalog and a fresh data directory.
    #[must_use]
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let dir = tmp.path().to_path_buf();
        Self::build(&dir, Some(tmp))
    }

    /// Storefront persisting into `data_dir`, e.g. to simulate a restart.
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::build(data_dir, None)
    }

    fn build(data_dir: &Path, tmp: Option<TempDir>) -> Self {
        let catalog = Catalog::builtin().expect("built-in catalog is valid");
        let storage = Box::new(FileStorage::new(data_dir));
        let state = AppState::new(catalog, storage);
        let router = routes::app(state.clone(), &static_dir());
        Self {
            state,
            router,
            data_dir: data_dir.to_path_buf(),
            _tmp: tmp,
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    /// POST a urlencoded form body (may be empty).
    pub async fn post(&self, uri: &str, form: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .expect("valid request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Aggregate quantity as reported by the badge fragment.
    pub async fn cart_count(&self) -> u32 {
        let response = self.get("/cart/count").await;
        assert_eq!(response.status, StatusCode::OK);
        let text: String = response
            .body
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        text.parse().expect("badge holds a number")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn static_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../storefront/static")
}
