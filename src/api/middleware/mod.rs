//! API middleware components

pub mod bearer;
pub mod metrics;
pub mod security;

pub use bearer::{extract_bearer_token, RequireClaims};
pub use metrics::metrics_middleware;
pub use security::{security_headers_middleware, MAX_BODY_SIZE};
