use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - an authored blog entry with publication state.
///
/// `pub_date` may lie in the future: such a post stays hidden from everyone
/// but its author until the date passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    /// Path of the attached image under `post_images/`, if any.
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Author-editable fields of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub is_published: bool,
}

impl Post {
    /// Create a new post owned by `author_id`.
    pub fn new(author_id: Uuid, draft: PostDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            text: draft.text,
            image: draft.image,
            pub_date: draft.pub_date,
            author_id,
            location_id: draft.location_id,
            category_id: draft.category_id,
            is_published: draft.is_published,
            created_at: Utc::now(),
        }
    }

    /// Replace the editable fields. Author and creation time never change.
    pub fn apply(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.text = draft.text;
        self.image = draft.image;
        self.pub_date = draft.pub_date;
        self.location_id = draft.location_id;
        self.category_id = draft.category_id;
        self.is_published = draft.is_published;
    }
}
