//! Infrastructure Layer
//!
//! Process-wide services backing the relay:
//! - Prometheus metrics

pub mod metrics;
