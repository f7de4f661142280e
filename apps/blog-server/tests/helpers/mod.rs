//! Shared fixtures for HTTP integration tests.
//!
//! Every test gets its own in-memory store, seeded through the repository
//! ports, and signs its own bearer tokens.
#![allow(dead_code)]

use std::sync::Arc;

use actix_web::http::header;
use chrono::{Duration, Utc};

use blog_server::Services;
use blog_server::state::AppState;
use blogicum_core::domain::{Category, Comment, Location, Post, PostDraft, User};
use blogicum_core::ports::TokenService;
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

pub const PAGE_SIZE: u64 = 10;

pub struct TestContext {
    pub services: Services,
    tokens: Arc<JwtTokenService>,
}

impl TestContext {
    pub fn new() -> Self {
        let tokens = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "integration-test-secret".to_string(),
            ..JwtConfig::default()
        }));

        Self {
            services: Services {
                state: AppState::in_memory(Arc::new(InMemoryStore::new()), PAGE_SIZE),
                tokens: tokens.clone(),
                passwords: Arc::new(Argon2PasswordService::new()),
            },
            tokens,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.services.state
    }

    pub async fn user(&self, username: &str) -> User {
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "unused-hash".to_string(),
        );
        self.state().users.insert(user).await.unwrap()
    }

    /// `Authorization` header for `user`.
    pub fn auth(&self, user: &User) -> (header::HeaderName, String) {
        let token = self.tokens.generate_token(user.id, &user.username).unwrap();
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    pub async fn category(&self, slug: &str, is_published: bool) -> Category {
        let mut category = Category::new(
            format!("Category {slug}"),
            format!("Posts about {slug}"),
            slug.to_string(),
        );
        category.is_published = is_published;
        self.state().categories.insert(category).await.unwrap()
    }

    pub async fn location(&self, name: &str, is_published: bool) -> Location {
        let mut location = Location::new(name.to_string());
        location.is_published = is_published;
        self.state().locations.insert(location).await.unwrap()
    }

    /// A published post dated one hour ago; `adjust` tweaks it before saving.
    pub async fn post(&self, author: &User, title: &str, adjust: impl FnOnce(&mut Post)) -> Post {
        let mut post = Post::new(
            author.id,
            PostDraft {
                title: title.to_string(),
                text: format!("Body of {title}"),
                image: None,
                pub_date: Utc::now() - Duration::hours(1),
                location_id: None,
                category_id: None,
                is_published: true,
            },
        );
        adjust(&mut post);
        self.state().posts.insert(post).await.unwrap()
    }

    pub async fn comment(&self, post: &Post, author: &User, text: &str) -> Comment {
        let comment = Comment::new(post.id, author.id, text.to_string());
        self.state().comments.insert(comment).await.unwrap()
    }
}
