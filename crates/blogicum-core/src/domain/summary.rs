use serde::{Deserialize, Serialize};

use super::{Category, Comment, Location, Post};

/// A post joined with everything a listing or detail page shows about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub post: Post,
    pub author_username: String,
    pub category: Option<Category>,
    pub location: Option<Location>,
    /// Aggregated per query, never stored.
    pub comment_count: u64,
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSummary {
    pub comment: Comment,
    pub author_username: String,
}
