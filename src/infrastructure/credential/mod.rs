//! Credential infrastructure module
//!
//! Argon2id secret hashing, in-memory and PostgreSQL credential stores, and
//! the register/login orchestrator.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserStore;
pub use repository::InMemoryUserStore;
pub use service::AuthService;

#[cfg(test)]
pub(crate) use password::fast_hasher;
