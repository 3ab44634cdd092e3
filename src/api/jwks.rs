//! JWKS discovery endpoint

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};

use super::state::AppState;

pub const JWKS_PATH: &str = "/.well-known/jwks.json";

pub fn create_jwks_router() -> Router<AppState> {
    Router::new().route(JWKS_PATH, get(jwks))
}

/// GET /.well-known/jwks.json
///
/// Serves the document rendered at startup with a public cache lifetime.
pub async fn jwks(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CACHE_CONTROL, state.jwks.cache_control().to_string()),
        ],
        state.jwks.body().to_string(),
    )
}
