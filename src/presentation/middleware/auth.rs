//! Access Gate Middleware
//!
//! Session-cookie check in front of the chat page and the relay socket.
//! Only the presence of the session cookie is checked here; issuing and
//! validating sessions is somebody else's job.

use axum::{
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::Cookie;

use crate::startup::AppState;

/// Gate requests on the session cookie.
///
/// No cookie: temporary redirect to the login page, the wrapped handler is
/// not called. Otherwise the request continues unconditionally.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let auth = &state.settings.auth;

    if has_session(request.headers(), &auth.cookie_name) {
        return next.run(request).await;
    }

    tracing::debug!(
        path = %request.uri().path(),
        login = %auth.login_path,
        "No session cookie, redirecting"
    );
    Redirect::temporary(&auth.login_path).into_response()
}

/// Whether any `Cookie` header carries a cookie named `cookie_name`.
///
/// Header bytes outside ASCII are decoded lossily, so an unrelated cookie
/// with a raw UTF-8 value never hides the session. Malformed pairs are
/// skipped.
fn has_session(headers: &HeaderMap, cookie_name: &str) -> bool {
    headers.get_all(COOKIE).iter().any(|value| {
        let value = String::from_utf8_lossy(value.as_bytes());
        Cookie::split_parse(&*value)
            .filter_map(Result::ok)
            .any(|cookie| cookie.name() == cookie_name)
    })
}
