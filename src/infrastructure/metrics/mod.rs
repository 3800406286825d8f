//! Prometheus Metrics Module
//!
//! Provides relay-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Active client gauge (as seen by the hub)
//! - Connection counter and connection lifetime histogram
//! - Broadcast, delivery and eviction counters

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Clients currently in the hub's active set
pub static CLIENTS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("clients_active", "Number of clients in the hub's active set")
            .namespace("chat_relay"),
    )
    .expect("Failed to create CLIENTS_ACTIVE metric")
});

/// Upgraded WebSocket connections since startup
pub static CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("connections_total", "Total number of upgraded connections")
            .namespace("chat_relay"),
    )
    .expect("Failed to create CONNECTIONS_TOTAL metric")
});

/// Connection lifetime histogram
pub static CONNECTION_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    let buckets = vec![1.0, 5.0, 30.0, 60.0, 300.0, 900.0, 3600.0, 14400.0];
    Histogram::with_opts(
        HistogramOpts::new(
            "connection_duration_seconds",
            "Lifetime of relay connections in seconds",
        )
        .namespace("chat_relay")
        .buckets(buckets),
    )
    .expect("Failed to create CONNECTION_DURATION_SECONDS metric")
});

/// Broadcast events processed by the hub
pub static BROADCASTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("broadcasts_total", "Total number of messages fanned out")
            .namespace("chat_relay"),
    )
    .expect("Failed to create BROADCASTS_TOTAL metric")
});

/// Payloads accepted by a client's outbound queue
pub static DELIVERIES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("deliveries_total", "Total number of payloads enqueued to clients")
            .namespace("chat_relay"),
    )
    .expect("Failed to create DELIVERIES_TOTAL metric")
});

/// Clients dropped because their outbound queue was full or gone
pub static EVICTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("evictions_total", "Total number of clients evicted during fan-out")
            .namespace("chat_relay"),
    )
    .expect("Failed to create EVICTIONS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(CLIENTS_ACTIVE.clone()))
        .expect("Failed to register CLIENTS_ACTIVE");
    registry
        .register(Box::new(CONNECTIONS_TOTAL.clone()))
        .expect("Failed to register CONNECTIONS_TOTAL");
    registry
        .register(Box::new(CONNECTION_DURATION_SECONDS.clone()))
        .expect("Failed to register CONNECTION_DURATION_SECONDS");
    registry
        .register(Box::new(BROADCASTS_TOTAL.clone()))
        .expect("Failed to register BROADCASTS_TOTAL");
    registry
        .register(Box::new(DELIVERIES_TOTAL.clone()))
        .expect("Failed to register DELIVERIES_TOTAL");
    registry
        .register(Box::new(EVICTIONS_TOTAL.clone()))
        .expect("Failed to register EVICTIONS_TOTAL");
}

/// Metrics export failures
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("metrics output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> Result<String, MetricsError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a finished connection
pub fn record_connection_closed(duration_secs: f64) {
    CONNECTION_DURATION_SECONDS.observe(duration_secs);
}
