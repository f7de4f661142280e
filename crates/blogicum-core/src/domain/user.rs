use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - owns posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_names(mut self, first_name: String, last_name: String) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) {
        self.username = update.username;
        self.email = update.email;
        self.first_name = update.first_name;
        self.last_name = update.last_name;
        self.updated_at = Utc::now();
    }
}
