//! Post visibility predicate.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Viewer;
use crate::domain::{Category, Post};

/// Whether a post is visible to everyone at `now`.
///
/// The post must be published, its category (if any) must be published, and
/// its publication date must not be in the future.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && category.is_none_or(|c| c.is_published) && post.pub_date <= now
}

/// Whether `viewer` may see `post`. Authors always see their own posts.
pub fn can_view(
    viewer: Viewer,
    post: &Post,
    category: Option<&Category>,
    now: DateTime<Utc>,
) -> bool {
    viewer.is(post.author_id) || is_publicly_visible(post, category, now)
}

/// Which publication states a listing admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only publicly visible posts, evaluated at `now`.
    Public { now: DateTime<Utc> },
    /// Every post, including drafts and deferred ones.
    Unrestricted,
}

/// Predicate selecting the candidate posts of a listing.
///
/// Repositories translate it into their own query language; `matches`
/// evaluates it in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub visibility: Visibility,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}

impl PostFilter {
    pub fn public(now: DateTime<Utc>) -> Self {
        Self {
            visibility: Visibility::Public { now },
            category_id: None,
            author_id: None,
        }
    }

    pub fn unrestricted() -> Self {
        Self {
            visibility: Visibility::Unrestricted,
            category_id: None,
            author_id: None,
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// `category` must be the post's category, if it has one.
    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        if self.category_id.is_some_and(|id| post.category_id != Some(id)) {
            return false;
        }
        if self.author_id.is_some_and(|id| post.author_id != id) {
            return false;
        }
        match self.visibility {
            Visibility::Public { now } => is_publicly_visible(post, category, now),
            Visibility::Unrestricted => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostDraft;
    use chrono::TimeDelta;

    fn post(author_id: Uuid, pub_date: DateTime<Utc>, category_id: Option<Uuid>) -> Post {
        Post::new(
            author_id,
            PostDraft {
                title: "Title".to_string(),
                text: "Text".to_string(),
                image: None,
                pub_date,
                location_id: None,
                category_id,
                is_published: true,
            },
        )
    }

    fn category(is_published: bool) -> Category {
        let mut category = Category::new("Travel".into(), "Trips".into(), "travel".into());
        category.is_published = is_published;
        category
    }

    #[test]
    fn test_published_past_post_is_public() {
        let now = Utc::now();
        let cat = category(true);
        let p = post(Uuid::new_v4(), now - TimeDelta::days(1), Some(cat.id));

        assert!(is_publicly_visible(&p, Some(&cat), now));
        assert!(can_view(Viewer::Anonymous, &p, Some(&cat), now));
    }

    #[test]
    fn test_post_without_category_is_public() {
        let now = Utc::now();
        let p = post(Uuid::new_v4(), now, None);

        assert!(is_publicly_visible(&p, None, now));
    }

    #[test]
    fn test_unpublished_post_is_hidden_except_from_author() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let mut p = post(author, now - TimeDelta::hours(1), None);
        p.is_published = false;

        assert!(!can_view(Viewer::Anonymous, &p, None, now));
        assert!(!can_view(Viewer::User(Uuid::new_v4()), &p, None, now));
        assert!(can_view(Viewer::User(author), &p, None, now));
    }

    #[test]
    fn test_future_post_is_hidden_except_from_author() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let p = post(author, now + TimeDelta::days(1), None);

        assert!(!can_view(Viewer::Anonymous, &p, None, now));
        assert!(can_view(Viewer::User(author), &p, None, now));
    }

    #[test]
    fn test_unpublished_category_hides_published_post() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let cat = category(false);
        let p = post(author, now - TimeDelta::days(1), Some(cat.id));

        assert!(!is_publicly_visible(&p, Some(&cat), now));
        assert!(can_view(Viewer::User(author), &p, Some(&cat), now));
    }

    #[test]
    fn test_filter_matches_category_and_author() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let cat = category(true);
        let p = post(author, now - TimeDelta::days(1), Some(cat.id));

        assert!(PostFilter::public(now).in_category(cat.id).matches(&p, Some(&cat)));
        assert!(!PostFilter::public(now).in_category(Uuid::new_v4()).matches(&p, Some(&cat)));
        assert!(PostFilter::public(now).by_author(author).matches(&p, Some(&cat)));
        assert!(!PostFilter::public(now).by_author(Uuid::new_v4()).matches(&p, Some(&cat)));
    }

    #[test]
    fn test_unrestricted_filter_admits_drafts() {
        let now = Utc::now();
        let mut p = post(Uuid::new_v4(), now + TimeDelta::days(3), None);
        p.is_published = false;

        assert!(PostFilter::unrestricted().matches(&p, None));
        assert!(!PostFilter::public(now).matches(&p, None));
    }
}
