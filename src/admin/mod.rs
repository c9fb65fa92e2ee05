//! Management listener.
//!
//! ```text
//! GET    /list          → 200, JSON array of {id, from, to}
//! POST   /list {from,to} → 200 | 400
//! DELETE /list?id=<int> → 200 | 400
//! GET    /*             → management UI (static files)
//! ```

pub mod auth;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::config::{AdminConfig, TimeoutConfig};
use crate::http::proxy::HttpClient;
use crate::routing::Registry;

/// State shared by the management handlers.
#[derive(Clone)]
pub struct AdminState {
    pub registry: Arc<Registry>,
    pub client: HttpClient,
    pub api_key: Option<Arc<str>>,
}

#[allow(deprecated)]
pub fn setup_admin_router(state: AdminState, admin: &AdminConfig, timeouts: &TimeoutConfig) -> Router {
    Router::new()
        .route(
            "/list",
            get(list_rules)
                .post(create_rule)
                .delete(delete_rule)
                .fallback(method_not_found),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .fallback_service(ServeDir::new(&admin.static_dir))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs)))
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the management API and UI.
pub struct AdminServer {
    router: Router,
}

impl AdminServer {
    pub fn new(
        registry: Arc<Registry>,
        client: HttpClient,
        admin: &AdminConfig,
        timeouts: &TimeoutConfig,
    ) -> Self {
        let state = AdminState {
            registry,
            client,
            api_key: admin.api_key.as_deref().map(Arc::from),
        };
        Self {
            router: setup_admin_router(state, admin, timeouts),
        }
    }

    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Management listener starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!(address = %addr, "Management listener stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::proxy::build_client;
    use crate::store::MemoryStore;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    struct Harness {
        router: Router,
        registry: Arc<Registry>,
        store: Arc<MemoryStore>,
    }

    fn harness(api_key: Option<&str>) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let registry = Arc::new(Registry::new(store.clone()));
        let admin = AdminConfig {
            static_dir: "frontend".into(),
            api_key: api_key.map(String::from),
        };
        let state = AdminState {
            registry: registry.clone(),
            client: build_client(),
            api_key: admin.api_key.as_deref().map(Arc::from),
        };
        Harness {
            router: setup_admin_router(state, &admin, &TimeoutConfig::default()),
            registry,
            store,
        }
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_empty() {
        let h = harness(None);
        let response = h.router.oneshot(request(Method::GET, "/list", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let h = harness(None);
        let response = h
            .router
            .clone()
            .oneshot(request(
                Method::POST,
                "/list",
                r#"{"id": 42, "from": "http://a.com/api", "to": "http://127.0.0.1:9001"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());

        let response = h.router.oneshot(request(Method::GET, "/list", "")).await.unwrap();
        assert_eq!(
            body_json(response).await,
            serde_json::json!([{"id": 0, "from": "http://a.com/api/", "to": "http://127.0.0.1:9001/"}])
        );
        assert_eq!(h.store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_json() {
        let h = harness(None);
        let response = h
            .router
            .oneshot(request(Method::POST, "/list", r#"{"from": "http://a.com/""#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(h.registry.is_empty());
        assert_eq!(h.store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_url() {
        let h = harness(None);
        let response = h
            .router
            .oneshot(request(Method::POST, "/list", r#"{"from": "http://a.com/", "to": "not a url"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(h.registry.is_empty());
        assert_eq!(h.store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let h = harness(None);
        let route = crate::routing::Route::parse("http://a.com/", "http://127.0.0.1:1", &build_client()).unwrap();
        h.registry.append(route);

        let response = h.router.oneshot(request(Method::DELETE, "/list?id=0", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(h.registry.is_empty());
        assert_eq!(h.store.save_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_or_invalid_id() {
        let h = harness(None);
        for uri in ["/list?id=999", "/list?id=abc", "/list?id=-1", "/list"] {
            let response = h.router.clone().oneshot(request(Method::DELETE, uri, "")).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
        assert_eq!(h.store.save_count(), 0);
    }

    /// Records which thread ran each save.
    #[derive(Default)]
    struct ThreadRecordingStore {
        save_threads: parking_lot::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl crate::store::RuleStore for ThreadRecordingStore {
        fn load(&self) -> Result<Vec<crate::routing::RuleDescriptor>, crate::store::StoreError> {
            Ok(Vec::new())
        }

        fn save(&self, _rules: &[crate::routing::RuleDescriptor]) -> Result<(), crate::store::StoreError> {
            self.save_threads.lock().push(std::thread::current().id());
            Ok(())
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_mutations_save_off_the_runtime_thread() {
        let store = Arc::new(ThreadRecordingStore::default());
        let registry = Arc::new(Registry::new(store.clone()));
        let admin = AdminConfig::default();
        let state = AdminState {
            registry: registry.clone(),
            client: build_client(),
            api_key: None,
        };
        let router = setup_admin_router(state, &admin, &TimeoutConfig::default());

        let response = router
            .clone()
            .oneshot(request(
                Method::POST,
                "/list",
                r#"{"from": "http://a.com/", "to": "http://127.0.0.1:1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router.oneshot(request(Method::DELETE, "/list?id=0", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(registry.is_empty());

        let runtime_thread = std::thread::current().id();
        let save_threads = store.save_threads.lock();
        assert_eq!(save_threads.len(), 2);
        assert!(save_threads.iter().all(|t| *t != runtime_thread));
    }

    #[tokio::test]
    async fn test_other_method_on_list_is_404() {
        let h = harness(None);
        let response = h.router.oneshot(request(Method::PUT, "/list", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_key_required_when_configured() {
        let h = harness(Some("s3cret"));

        let response = h.router.clone().oneshot(request(Method::GET, "/list", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut authorized = request(Method::GET, "/list", "");
        authorized
            .headers_mut()
            .insert(header::AUTHORIZATION, "Bearer s3cret".parse().unwrap());
        let response = h.router.oneshot(authorized).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
