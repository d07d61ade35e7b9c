use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ALERTS_RECEIVED_TOTAL: IntCounter = register_int_counter_with_registry!(
        "health_alert_received_total",
        "Total number of health alerts received.",
        REGISTRY
    )
    .expect("metric can be registered");
    pub static ref ALERT_OUTCOMES_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        "health_alert_outcomes_total",
        "Health alerts by outcome (success, bad_request, internal_error).",
        &["outcome"],
        REGISTRY
    )
    .expect("metric can be registered");
    pub static ref NOTIFY_FAILURES_TOTAL: IntCounter = register_int_counter_with_registry!(
        "health_alert_notify_failures_total",
        "Notifications that could not be delivered.",
        REGISTRY
    )
    .expect("metric can be registered");
}

/// Text exposition of every registered metric.
pub fn gather_metrics() -> crate::Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| crate::Error::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| crate::Error::Internal(format!("Metrics are not UTF-8: {}", e)))
}
