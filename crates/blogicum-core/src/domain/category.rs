use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity - a labeled grouping of posts with its own publish state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Unique URL identifier: Latin letters, digits, hyphen and underscore.
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new, published category.
    pub fn new(title: String, description: String, slug: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            slug,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    /// Check that a slug only uses the characters allowed in URLs.
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_validation() {
        assert!(Category::is_valid_slug("travel_2024-notes"));
        assert!(!Category::is_valid_slug(""));
        assert!(!Category::is_valid_slug("путешествия"));
        assert!(!Category::is_valid_slug("with space"));
    }
}
