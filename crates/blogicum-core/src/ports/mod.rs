//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod pagination;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use pagination::{Page, PageRequest};
pub use repository::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};
