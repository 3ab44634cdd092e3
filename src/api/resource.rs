//! Demo resource endpoint protected by bearer tokens

use axum::{routing::get, Router};

use super::middleware::RequireClaims;
use super::state::ResourceState;

pub fn create_resource_routes() -> Router<ResourceState> {
    Router::new().route("/hello", get(hello))
}

/// GET /hello
pub async fn hello(RequireClaims(claims): RequireClaims) -> String {
    format!("Hello, {}", claims.sub)
}
