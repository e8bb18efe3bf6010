use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gateway_requests_total", "Total number of AI requests").unwrap();
    pub static ref RATE_LIMITED: Counter = register_counter!(
        "gateway_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref STREAM_ERRORS: Counter = register_counter!(
        "gateway_stream_errors_total",
        "Upstream streaming failures reported in-band"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "gateway_request_latency_seconds",
        "Time from admission to response start in seconds"
    )
    .unwrap();
    pub static ref DOCUMENTS_STORED: Gauge = register_gauge!(
        "gateway_documents_stored",
        "Current number of stored documents"
    )
    .unwrap();
}
