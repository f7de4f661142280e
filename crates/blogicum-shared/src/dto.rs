//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Usernames allow letters, digits and `@ . + - _`.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if username.chars().all(allowed) {
        Ok(())
    } else {
        let mut error = ValidationError::new("username");
        error.message = Some("Letters, digits and @/./+/-/_ only".into());
        Err(error)
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(max = 30, message = "At most 30 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 30, message = "At most 30 characters"))]
    pub last_name: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// The caller's own account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Public part of a user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

/// Request to change the caller's own profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "At most 150 characters"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "At most 150 characters"))]
    pub last_name: String,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Create or edit a post. `pub_date` defaults to the time of the request.
///
/// Omitted text fields deserialize as empty so validation reports them
/// per field.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 256, message = "Title must be 1-256 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: String,
    /// Path of an already uploaded image.
    #[validate(length(min = 1, max = 100, message = "Image path must be 1-100 characters"))]
    pub image: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub title: String,
    pub description: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationResponse {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub category: Option<CategoryResponse>,
    /// Only set while the location is published.
    pub location: Option<LocationResponse>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub comment_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

/// A listing page: index, category or profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileResponse>,
    pub posts: crate::PageResponse<PostResponse>,
}

/// Query string of listing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommentRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(username: &str, email: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(registration("anna.k", "anna@example.com", "long-enough").validate().is_ok());
    }

    #[test]
    fn test_registration_reports_each_field() {
        let errors = registration("bad name!", "not-an-email", "short")
            .validate()
            .unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_post_request_defaults_to_published() {
        let request: PostRequest =
            serde_json::from_str(r#"{"title": "Hello", "text": "World"}"#).unwrap();

        assert!(request.is_published);
        assert!(request.pub_date.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_field_errors() {
        let request: PostRequest = serde_json::from_str(r#"{"text": "World"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let comment: CommentRequest = serde_json::from_str("{}").unwrap();
        assert!(comment.validate().unwrap_err().field_errors().contains_key("text"));
    }

    #[test]
    fn test_post_request_rejects_empty_title() {
        let request: PostRequest =
            serde_json::from_str(r#"{"title": "", "text": "World"}"#).unwrap();

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }
}
