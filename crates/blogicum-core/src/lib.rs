//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog.
//! This crate contains the entities, the visibility and authorization rules,
//! and the listing assembly logic. It has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;

pub use error::{DomainError, FieldError};
