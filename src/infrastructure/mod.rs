//! Infrastructure layer - External service implementations

pub mod auth;
pub mod credential;
pub mod logging;
pub mod observability;
