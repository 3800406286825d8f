//! WebSocket Adapter
//!
//! Turns an upgraded WebSocket into a hub client.

pub mod framing;
pub mod handler;

pub use handler::ws_handler;
