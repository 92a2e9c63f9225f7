//! Common test utilities for in-process API testing.
//!
//! The fixture builds the full router backed by a fresh engine and an
//! in-memory audit store, so tests exercise the real request path without
//! binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use clinicflow_core::{
    create_audit_system, AuditStore, Config, MemoryAuditStore, QueueEngine, ServiceMode, Topology,
};
use clinicflow_server::api::create_router;
use clinicflow_server::state::AppState;

/// In-process test server.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Audit store backing the router, for direct inspection
    pub audit_store: Arc<dyn AuditStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for the test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub default_mode: ServiceMode,
    pub diagnostics_enabled: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            default_mode: ServiceMode::Linear,
            diagnostics_enabled: true,
        }
    }
}

impl TestConfig {
    pub fn multi_stream() -> Self {
        Self {
            default_mode: ServiceMode::MultiStream,
            ..Default::default()
        }
    }

    pub fn without_diagnostics() -> Self {
        Self {
            diagnostics_enabled: false,
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Create a fixture with default configuration (Linear, diagnostics on).
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let mut config = Config::default();
        config.clinic.default_mode = test_config.default_mode;
        config.clinic.diagnostics_enabled = test_config.diagnostics_enabled;

        let audit_store: Arc<dyn AuditStore> = Arc::new(MemoryAuditStore::new(1000));
        let (audit_handle, audit_writer) = create_audit_system(Arc::clone(&audit_store), 100);
        tokio::spawn(audit_writer.run());

        let topology = Topology::new(test_config.diagnostics_enabled);
        let engine = Arc::new(QueueEngine::new(topology, test_config.default_mode));

        let state = Arc::new(AppState::new(
            config,
            engine,
            audit_handle,
            Arc::clone(&audit_store),
        ));

        Self {
            router: create_router(state),
            audit_store,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with an empty body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
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
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
