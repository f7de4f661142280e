//! Edit/delete permission for posts and comments.
//!
//! Only authors may change what they wrote. A denial is not an error page:
//! anonymous viewers are sent to log in, everyone else back to the post.

use uuid::Uuid;

use super::Viewer;
use crate::domain::{Comment, Post};

/// A mutating operation on an authored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Edit,
    Delete,
}

/// The entity an operation is applied to.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Post(&'a Post),
    Comment(&'a Comment),
}

impl Target<'_> {
    pub fn author_id(&self) -> Uuid {
        match self {
            Target::Post(post) => post.author_id,
            Target::Comment(comment) => comment.author_id,
        }
    }

    /// The post whose detail page a denied viewer is sent to.
    pub fn post_id(&self) -> Uuid {
        match self {
            Target::Post(post) => post.id,
            Target::Comment(comment) => comment.post_id,
        }
    }
}

/// Where a denied request is redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// The authentication flow; the caller appends the original path.
    Login,
    PostDetail { post_id: Uuid },
}

/// Outcome of an authorization check, decided once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Authorized(Uuid),
    Denied(Redirect),
}

impl Decision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Decision::Authorized(_))
    }

    pub fn into_result(self) -> Result<Uuid, Redirect> {
        match self {
            Decision::Authorized(user_id) => Ok(user_id),
            Decision::Denied(redirect) => Err(redirect),
        }
    }
}

/// Login gate for operations that create rather than change an entity.
pub fn require_login(viewer: Viewer) -> Result<Uuid, Redirect> {
    viewer.id().ok_or(Redirect::Login)
}

/// Decide whether `viewer` may apply `operation` to `target`.
///
/// Both operations share one rule; `operation` is part of the signature so
/// callers state what they are about to do.
pub fn authorize(viewer: Viewer, target: Target<'_>, _operation: Operation) -> Decision {
    match viewer {
        Viewer::Anonymous => Decision::Denied(Redirect::Login),
        Viewer::User(user_id) if user_id == target.author_id() => Decision::Authorized(user_id),
        Viewer::User(_) => Decision::Denied(Redirect::PostDetail {
            post_id: target.post_id(),
        }),
    }
}
