#![allow(dead_code)]

use std::sync::Arc;

use axum::http::HeaderName;
use axum::Router;
use axum_test::TestServer;

use jotter::app::{router, AppState};
use jotter::auth::provider::{DemoCookieProvider, IdentityProvider, TrustedHeaderProvider};
use jotter::db::memory::InMemoryDocumentRepository;
use jotter::db::repository::DocumentRepository;
use jotter::documents::LifecycleOptions;

pub const SUBJECT_HEADER: &str = "x-auth-subject";

/// An in-process application wired to the in-memory store.
pub struct TestEnv {
    pub router: Router,
    pub repo: Arc<InMemoryDocumentRepository>,
}

impl TestEnv {
    /// Demo cookie authentication with default lifecycle options.
    pub fn start() -> Self {
        Self::with_options(LifecycleOptions::default())
    }

    pub fn with_options(lifecycle: LifecycleOptions) -> Self {
        Self::build(Arc::new(DemoCookieProvider), lifecycle, true)
    }

    /// Trusted header authentication; the demo login routes are not mounted.
    pub fn with_header_auth() -> Self {
        let provider = TrustedHeaderProvider::new(HeaderName::from_static(SUBJECT_HEADER));
        Self::build(Arc::new(provider), LifecycleOptions::default(), false)
    }

    fn build(
        identity_provider: Arc<dyn IdentityProvider>,
        lifecycle: LifecycleOptions,
        demo_mode: bool,
    ) -> Self {
        let repo = Arc::new(InMemoryDocumentRepository::new());
        let document_repo: Arc<dyn DocumentRepository> = repo.clone();

        let router = router(AppState {
            document_repo,
            identity_provider,
            lifecycle,
            demo_mode,
        });

        Self { router, repo }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> TestServer {
        TestServer::builder()
            .save_cookies()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> TestServer {
        TestServer::builder()
            .save_cookies()
            .build(self.router.clone())
    }

    /// A permissive server already logged in as a demo user.
    ///
    /// Each call returns a separate cookie jar, so two users can act on the
    /// same store side by side.
    pub async fn login(&self, username: &str) -> TestServer {
        let server = self.server_permissive();
        server
            .post("/api/auth/login")
            .json(&serde_json::json!({
                "username": username,
                "password": username
            }))
            .expect_success()
            .await;
        server
    }
}

/// Helper: create a document and return its JSON body.
pub async fn create_doc(
    server: &TestServer,
    title: &str,
    parent_id: Option<&str>,
) -> serde_json::Value {
    server
        .post("/api/v1/documents")
        .json(&serde_json::json!({
            "title": title,
            "parent_id": parent_id
        }))
        .expect_success()
        .await
        .json()
}

/// Helper: the `_id` of a document JSON body.
pub fn id_of(doc: &serde_json::Value) -> String {
    doc["_id"].as_str().expect("document has an _id").to_string()
}

/// Helper: titles of a JSON array of documents, in response order.
pub fn titles(docs: &serde_json::Value) -> Vec<String> {
    docs.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|d| d["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
