//! Access Gate Tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{COOKIE, LOCATION},
        HeaderValue, Request, StatusCode,
    },
    middleware,
    routing::get,
    Router,
};
use chat_relay::presentation::middleware::require_session;
use pretty_assertions::assert_eq;
use test_case::test_case;
use tower::ServiceExt;

use crate::common::{body_text, TestApp};

/// Router with a counting handler behind the gate
fn counting_router(app: &TestApp, calls: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/chat",
            get(move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    "chat"
                }
            }),
        )
        .route_layer(middleware::from_fn_with_state(
            app.state.clone(),
            require_session,
        ))
        .with_state(app.state.clone())
}

#[tokio::test]
async fn test_missing_session_redirects_without_calling_handler() {
    let app = TestApp::new().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let router = counting_router(&app, Arc::clone(&calls));

    let response = router
        .oneshot(Request::builder().uri("/chat").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/login");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_session_reaches_handler() {
    let app = TestApp::new().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let router = counting_router(&app, Arc::clone(&calls));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/chat")
                .header(COOKIE, "theme=dark; auth=token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "chat");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_ascii_cookie_still_reaches_handler() {
    let app = TestApp::new().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let router = counting_router(&app, Arc::clone(&calls));

    let mut request = Request::builder().uri("/chat").body(Body::empty()).unwrap();
    request.headers_mut().insert(
        COOKIE,
        HeaderValue::from_bytes("auth=ok; name=José".as_bytes()).unwrap(),
    );

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_ascii_chat_page_request_renders() {
    let app = TestApp::new().await;

    let mut request = Request::builder().uri("/chat").body(Body::empty()).unwrap();
    request.headers_mut().insert(
        COOKIE,
        HeaderValue::from_bytes("name=José; auth=ok".as_bytes()).unwrap(),
    );

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[test_case("/chat" ; "chat page")]
#[test_case("/room" ; "relay socket")]
#[tokio::test]
async fn test_gated_routes_redirect_to_login(path: &str) {
    let app = TestApp::new().await;

    let response = app.get(path).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/login");
}

#[tokio::test]
async fn test_chat_page_renders_room_url() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::builder()
                .uri("/chat")
                .header("host", "relay.test:8080")
                .header(COOKIE, "auth=x")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("relay.test:8080/room"));
}

#[tokio::test]
async fn test_room_with_session_passes_gate() {
    let app = TestApp::new().await;

    // Not an upgrade request, so the WebSocket extractor rejects it after the gate
    let response = app.get_with_session("/room").await;

    assert_ne!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_public_routes_need_no_session() {
    let app = TestApp::new().await;

    assert_eq!(app.get("/login").await.status(), StatusCode::OK);

    let index = app.get("/").await;
    assert_eq!(index.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(index.headers()[LOCATION], "/chat");
}
