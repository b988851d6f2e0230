//! HTTP transport for the release intake service.
//!
//! # Endpoints
//!
//! - `POST /webhook` - accepts release-notification deliveries
//! - `GET /health` - liveness probe

use std::sync::Arc;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

use crate::intake::ReleaseRouter;

/// Shared application state, passed to handlers via axum's `State`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The event router every delivery goes through.
    router: Arc<ReleaseRouter>,

    /// Shared secret for signature verification; `None` disables the check.
    webhook_secret: Option<Vec<u8>>,
}

impl AppState {
    pub fn new(router: Arc<ReleaseRouter>, webhook_secret: Option<Vec<u8>>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                router,
                webhook_secret,
            }),
        }
    }

    pub fn router(&self) -> &ReleaseRouter {
        &self.inner.router
    }

    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.inner.webhook_secret.as_deref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::registry::RepositoryRegistry;
    use crate::store::ReleaseStore;
    use crate::types::{ReleaseId, Repository};
    use crate::webhooks::{compute_signature, format_signature_header};
    use crate::worker::{LogProcessor, release_queue};

    struct Fixture {
        app: axum::Router,
        store: ReleaseStore,
        // Keeps the queue consumer side alive so enqueues succeed.
        _queue_rx: tokio::sync::mpsc::Receiver<ReleaseId>,
    }

    fn fixture(secret: Option<&[u8]>) -> Fixture {
        let store = ReleaseStore::new();
        let registry = RepositoryRegistry::new();
        registry.register(Repository::new(7u64, "lib", true));
        registry.register(Repository::new(8u64, "paused-lib", false));

        let (tx, rx) = release_queue(16);
        let router = Arc::new(ReleaseRouter::new(
            store.clone(),
            registry,
            tx,
            Arc::new(LogProcessor),
        ));
        let app = build_router(AppState::new(router, secret.map(|s| s.to_vec())));
        Fixture {
            app,
            store,
            _queue_rx: rx,
        }
    }

    fn webhook_request(
        secret: Option<&[u8]>,
        delivery_id: &str,
        body: &Value,
    ) -> Request<Body> {
        let body_bytes = serde_json::to_vec(body).unwrap();
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header("x-github-delivery", delivery_id);

        if let Some(secret) = secret {
            let signature = compute_signature(&body_bytes, secret);
            builder = builder.header("x-hub-signature-256", format_signature_header(&signature));
        }

        builder.body(Body::from(body_bytes)).unwrap()
    }

    fn publish_body(release_id: u64, repo_id: u64, repo_name: &str) -> Value {
        json!({
            "action": "published",
            "release": {"id": release_id, "tag_name": "v1.0", "draft": false},
            "repository": {"id": repo_id, "name": repo_name}
        })
    }

    #[tokio::test]
    async fn health_returns_200() {
        let fx = fixture(None);
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = fx.app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn valid_publish_returns_202_and_records_the_release() {
        let secret: &[u8] = b"hook-secret";
        let fx = fixture(Some(secret));

        let request = webhook_request(Some(secret), "d-1", &publish_body(42, 7, "lib"));
        let response = fx.app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(
            fx.store
                .find_by_release_id(ReleaseId(42))
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn redelivery_returns_409_with_response_body() {
        let fx = fixture(None);

        let first = webhook_request(None, "d-1", &publish_body(42, 7, "lib"));
        let response = fx.app.clone().oneshot(first).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let retry = webhook_request(None, "d-2", &publish_body(42, 7, "lib"));
        let response = fx.app.oneshot(retry).await.unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], 409);
        assert_eq!(fx.store.len(), 1);
    }

    #[tokio::test]
    async fn draft_release_is_acknowledged_but_not_recorded() {
        let fx = fixture(None);

        let body = json!({
            "action": "published",
            "release": {"id": 1, "tag_name": "v1.0", "draft": true},
            "repository": {"id": 7, "name": "lib"}
        });
        let response = fx
            .app
            .oneshot(webhook_request(None, "d-1", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn ping_event_is_acknowledged_with_202() {
        let fx = fixture(None);

        let body = json!({"zen": "Keep it logically awesome."});
        let response = fx
            .app
            .oneshot(webhook_request(None, "d-1", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn disabled_repository_returns_409() {
        let fx = fixture(None);

        let response = fx
            .app
            .oneshot(webhook_request(
                None,
                "d-1",
                &publish_body(9, 8, "paused-lib"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn unknown_repository_returns_404() {
        let fx = fixture(None);

        let response = fx
            .app
            .oneshot(webhook_request(
                None,
                "d-1",
                &publish_body(9, 999, "never-registered"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn invalid_signature_returns_403() {
        let fx = fixture(Some(b"correct-secret".as_slice()));

        let request = webhook_request(
            Some(b"wrong-secret".as_slice()),
            "d-1",
            &publish_body(42, 7, "lib"),
        );
        let response = fx.app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn missing_signature_returns_403_when_secret_is_configured() {
        let fx = fixture(Some(b"hook-secret".as_slice()));

        let request = webhook_request(None, "d-1", &publish_body(42, 7, "lib"));
        let response = fx.app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_delivery_header_returns_400() {
        let fx = fixture(None);

        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = fx.app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_json_body_returns_400() {
        let fx = fixture(None);

        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header("x-github-delivery", "d-1")
            .body(Body::from("not json"))
            .unwrap();
        let response = fx.app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
