//! Page Handlers
//!
//! The chat page, the login page and the index redirect.

use axum::{
    extract::State,
    http::{header::HOST, HeaderMap},
    response::{Html, Redirect},
};

use crate::startup::AppState;

/// Host used in page links when the request carries none
const FALLBACK_HOST: &str = "localhost";

/// `GET /` sends visitors to the chat room
pub async fn index() -> Redirect {
    Redirect::temporary("/chat")
}

/// `GET /chat` renders the chat page for the requested host
pub async fn chat_page(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or(FALLBACK_HOST);

    Html(state.pages.chat.render(&[("host", host)]))
}

/// `GET /login`
pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    Html(state.pages.login.render(&[]))
}
