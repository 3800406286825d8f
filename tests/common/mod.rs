//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header::COOKIE, Request},
    Router,
};
use chat_relay::config::Settings;
use chat_relay::hub::HubHandle;
use chat_relay::presentation::http::create_router;
use chat_relay::startup::{AppState, Application};
use tokio::sync::oneshot;
use tower::ServiceExt;

/// Session cookie accepted by the access gate under default settings
pub const SESSION_COOKIE: &str = "auth=integration-test";

/// Settings suitable for tests: loopback, ephemeral port, no keepalive pings
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.server.host = "127.0.0.1".into();
    settings.server.port = 0;
    settings.websocket.ping_interval_secs = 0;
    settings.environment = "test".into();
    settings
}

/// In-process router driven with `oneshot`
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application backed by a live hub
    pub async fn new() -> Self {
        let state = AppState::new(test_settings()).expect("failed to build app state");
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.send(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Make a GET request carrying the session cookie
    pub async fn get_with_session(&self, uri: &str) -> axum::response::Response {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(COOKIE, SESSION_COOKIE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Send an arbitrary request
    pub async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Read a response body as UTF-8 text
pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A relay listening on a real socket. Dropping it shuts the server down.
pub struct TestServer {
    pub addr: SocketAddr,
    pub hub: HubHandle,
    _shutdown: oneshot::Sender<()>,
}

/// Build the full application on an ephemeral port and serve it in the background
pub async fn spawn_app() -> TestServer {
    let application = Application::build(test_settings())
        .await
        .expect("failed to build application");
    let addr = application.local_addr().unwrap();
    let hub = application.hub().clone();

    let (shutdown, stopped) = oneshot::channel::<()>();
    tokio::spawn(application.run_until(async move {
        let _ = stopped.await;
    }));

    TestServer {
        addr,
        hub,
        _shutdown: shutdown,
    }
}

/// Wait until the hub reports `expected` active clients
pub async fn wait_for_clients(hub: &HubHandle, expected: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while hub.active_clients() != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| {
        panic!(
            "expected {} active clients, hub reports {}",
            expected,
            hub.active_clients()
        )
    });
}
