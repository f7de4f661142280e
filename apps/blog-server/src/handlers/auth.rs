//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use blogicum_core::domain::User;
use blogicum_core::ports::{PasswordService, TokenService};
use blogicum_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest};

use super::{USERNAME_TAKEN, views};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::field("username", USERNAME_TAKEN));
    }

    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = User::new(req.username, req.email, password_hash).with_names(
        req.first_name.unwrap_or_default(),
        req.last_name.unwrap_or_default(),
    );
    let saved_user = state.users.insert(user).await?;
    tracing::info!(user_id = %saved_user.id, username = %saved_user.username, "User registered");

    let token = token_service
        .generate_token(saved_user.id, &saved_user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::debug!(username = %req.username, "Rejected login");
        return Err(AppError::Unauthorized);
    }

    let token = token_service
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// GET /auth/me/ - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(views::user(&user)))
}
