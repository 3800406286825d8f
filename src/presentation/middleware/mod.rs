//! Middleware
//!
//! Tower middleware for request processing.

pub mod auth;
pub mod logging;

pub use auth::require_session;
pub use logging::create_trace_layer;
