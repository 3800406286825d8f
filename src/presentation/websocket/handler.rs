//! WebSocket Connection Handler
//!
//! Upgrades `GET /room` and binds the resulting socket to a hub client.

use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{future, SinkExt, StreamExt};

use super::framing::{inbound_payload, outbound_message};
use crate::hub::{Client, Frame};
use crate::infrastructure::metrics;
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let settings = &state.settings.websocket;

    ws.read_buffer_size(settings.socket_buffer_size)
        .write_buffer_size(settings.socket_buffer_size)
        .max_message_size(settings.max_message_size)
        .on_failed_upgrade(|error| {
            tracing::warn!(error = %error, "WebSocket upgrade failed");
        })
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serve one upgraded connection until its read side terminates
async fn handle_socket(socket: WebSocket, state: AppState) {
    let started = Instant::now();
    let client = Client::new(state.hub.clone(), state.settings.hub.message_buffer_size)
        .with_keepalive(state.settings.websocket.ping_interval());
    let client_id = client.id();

    metrics::CONNECTIONS_TOTAL.inc();
    tracing::info!(client_id = %client_id, "Client connected");

    let (sender, receiver) = socket.split();

    // A close frame ends the inbound stream like a dropped connection
    let inbound = receiver
        .take_while(|message| future::ready(!matches!(message, Ok(Message::Close(_)))))
        .filter_map(|message| future::ready(message.map(inbound_payload).transpose()));

    let outbound = sender.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(outbound_message(frame))));

    if let Err(e) = client.serve(inbound, outbound).await {
        tracing::error!(client_id = %client_id, error = %e, "Client could not join hub");
    }

    metrics::record_connection_closed(started.elapsed().as_secs_f64());
    tracing::info!(
        client_id = %client_id,
        duration_ms = started.elapsed().as_millis() as u64,
        "Client disconnected"
    );
}
