//! # Blogicum Infrastructure
//!
//! Concrete implementations of the ports defined in `blogicum-core`:
//! PostgreSQL repositories, the in-memory store, and authentication.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//! - `minimal` - No database driver, in-memory store only

pub mod auth;
pub mod database;
pub mod memory;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::DatabaseConfig;
pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresRepositories};
