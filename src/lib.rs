//! # Chat Relay Library
//!
//! This crate provides a real-time broadcast relay: every message a
//! connected client sends is fanned out to every connected client,
//! best-effort and at-most-once.
//!
//! ## Architecture
//!
//! - **Hub**: one control loop owning the client set; join, leave and
//!   broadcast events are applied strictly one at a time
//! - **Client**: per-connection read/write loop pair with a bounded
//!   outbound queue; a full queue gets the client evicted
//! - **Presentation**: axum routes, the session-cookie access gate, page
//!   templates and the WebSocket adapter
//!
//! ## Module Structure
//!
//! ```text
//! chat_relay/
//! +-- config/         Configuration management
//! +-- hub/            Broadcast hub and clients
//! +-- infrastructure/ Metrics
//! +-- presentation/   HTTP routes, middleware and WebSocket adapter
//! +-- shared/         Common utilities (errors)
//! ```

// Configuration module
pub mod config;

// Broadcast hub - relay core
pub mod hub;

// Infrastructure - metrics
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
