//! Editing the caller's own profile.

use actix_web::{HttpRequest, HttpResponse, web};
use validator::Validate;

use blogicum_core::domain::ProfileUpdate;
use blogicum_core::policy::require_login;
use blogicum_shared::dto::UpdateProfileRequest;

use super::{USERNAME_TAKEN, deny, parse_body, views};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /profile/edit/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let user_id = require_login(identity.viewer()).map_err(|r| deny(r, &req))?;

    let request: UpdateProfileRequest = parse_body(&body)?;
    request.validate()?;

    let mut user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if request.username != user.username {
        if let Some(other) = state.users.find_by_username(&request.username).await? {
            if other.id != user.id {
                return Err(AppError::field("username", USERNAME_TAKEN));
            }
        }
    }

    user.update_profile(ProfileUpdate {
        username: request.username,
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
    });
    let user = state.users.update(user).await?;
    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(HttpResponse::Ok().json(views::user(&user)))
}
