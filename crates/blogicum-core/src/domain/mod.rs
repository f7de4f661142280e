//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod summary;
mod user;

pub use category::Category;
pub use comment::Comment;
pub use location::Location;
pub use post::{Post, PostDraft};
pub use summary::{CommentSummary, PostSummary};
pub use user::{ProfileUpdate, User};

/// Maximum length of titles and names, in characters.
pub const MAX_TITLE_LENGTH: usize = 256;
