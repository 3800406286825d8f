//! Presentation Layer
//!
//! HTTP routes, the access gate and the WebSocket adapter.

pub mod http;
pub mod middleware;
pub mod websocket;
