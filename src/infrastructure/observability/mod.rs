//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_http_request, record_login, record_registration,
    record_token_issued, PrometheusMetrics,
};
