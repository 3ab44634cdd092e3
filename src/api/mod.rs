//! API layer - HTTP endpoints and middleware

pub mod auth;
pub mod health;
pub mod jwks;
pub mod middleware;
pub mod resource;
pub mod router;
pub mod state;
pub mod types;

pub use middleware::RequireClaims;
pub use router::{create_resource_router, create_router, with_metrics};
pub use state::{AppState, ResourceState};
