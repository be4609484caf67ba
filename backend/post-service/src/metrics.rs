//! Prometheus metrics for post-service.
//!
//! Collectors register with the default registry on first use; `serve_metrics`
//! renders them for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, register_int_gauge, Encoder, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    /// Live WebSocket connections held by the hub.
    pub static ref WS_CONNECTIONS: IntGauge = register_int_gauge!(
        "post_ws_connections",
        "Live WebSocket connections registered with the broadcast hub"
    )
    .expect("failed to register post_ws_connections");

    /// Post channels with at least one subscriber.
    pub static ref WS_CHANNELS: IntGauge = register_int_gauge!(
        "post_ws_channels",
        "Post channels with at least one subscriber"
    )
    .expect("failed to register post_ws_channels");

    /// Broadcast events published, by event type.
    pub static ref BROADCASTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_broadcasts_total",
        "Events published by the broadcast hub segmented by event type",
        &["event"]
    )
    .expect("failed to register post_broadcasts_total");

    /// Persisted mutations, by operation.
    pub static ref MUTATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_mutations_total",
        "Persisted post mutations segmented by operation",
        &["op"]
    )
    .expect("failed to register post_mutations_total");
}

pub fn record_mutation(op: &str) {
    MUTATIONS_TOTAL.with_label_values(&[op]).inc();
}

pub fn record_broadcast(event: &str) {
    BROADCASTS_TOTAL.with_label_values(&[event]).inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
