//! WebSocket Framing
//!
//! Conversion between WebSocket messages and the hub's opaque payloads.
//!
//! The hub relays bytes only, so the inbound frame kind is not kept. On the
//! way out a payload that is valid UTF-8 becomes a text frame and anything
//! else a binary frame; a binary frame holding UTF-8 arrives at peers as text.

use axum::{body::Bytes, extract::ws::Message};

use crate::hub::Frame;

/// Map an inbound WebSocket message to a payload.
///
/// Text and binary frames carry payloads; control frames yield `None`.
pub fn inbound_payload(message: Message) -> Option<Bytes> {
    match message {
        Message::Text(_) | Message::Binary(_) => Some(message.into_data()),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
    }
}

/// Map an outbound frame to a WebSocket message.
///
/// UTF-8 payloads go out as text frames so browsers see strings.
pub fn outbound_message(frame: Frame) -> Message {
    match frame {
        Frame::Payload(payload) => match std::str::from_utf8(&payload) {
            Ok(text) => Message::Text(text.into()),
            Err(_) => Message::Binary(payload),
        },
        Frame::Ping => Message::Ping(Bytes::new()),
    }
}
