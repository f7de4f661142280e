use async_trait::async_trait;
use uuid::Uuid;

use super::pagination::{Page, PageRequest};
use crate::domain::{Category, Comment, CommentSummary, Location, Post, PostSummary, User};
use crate::error::RepoError;
use crate::policy::PostFilter;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their unique username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Find a category by its slug, published or not.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

/// Location repository.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Load one post with its author, category, location and comment count.
    async fn find_summary(&self, id: Uuid) -> Result<Option<PostSummary>, RepoError>;

    /// List posts matching `filter`, newest `pub_date` first.
    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// All comments of a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentSummary>, RepoError>;
}
