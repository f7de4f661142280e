//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod listings;
mod posts;
mod profile;
mod views;

use actix_web::{HttpRequest, error, web};
use serde::de::DeserializeOwned;

use blogicum_core::policy::Redirect;

use crate::middleware::error::{AppError, AppResult};

pub(crate) const USERNAME_TAKEN: &str = "A user with that username already exists";

/// Log a soft denial and turn it into a redirect response.
pub(crate) fn deny(redirect: Redirect, req: &HttpRequest) -> AppError {
    tracing::debug!(path = %req.path(), ?redirect, "Request denied");
    AppError::redirect(redirect, req.path())
}

/// Decode a JSON body. Gated handlers take the raw body and call this only
/// once the viewer has been let through.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &web::Bytes) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Json deserialize error: {e}")))
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| error::Error::from(AppError::BadRequest(err.to_string()))),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| error::Error::from(AppError::BadRequest(err.to_string()))),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err, _req| error::Error::from(AppError::NotFound("Not found".to_string()))),
    )
    // Public routes
    .route("/health", web::get().to(health::health_check))
    .route("/", web::get().to(listings::index))
    .route("/category/{slug}/", web::get().to(listings::category))
    .route("/profile/edit/", web::post().to(profile::edit))
    .route("/profile/{username}/", web::get().to(listings::profile))
    // Posts
    .service(
        web::scope("/posts")
            .route("/create/", web::post().to(posts::create))
            .route("/{id}/", web::get().to(posts::detail))
            .route("/{id}/edit/", web::post().to(posts::edit))
            .route("/{id}/delete/", web::post().to(posts::delete))
            .route("/{id}/comment/", web::post().to(comments::add))
            .route(
                "/{post_id}/edit_comment/{comment_id}/",
                web::post().to(comments::edit),
            )
            .route(
                "/{post_id}/delete_comment/{comment_id}/",
                web::post().to(comments::delete),
            ),
    )
    // Auth routes
    .service(
        web::scope("/auth")
            .route("/registration/", web::post().to(auth::register))
            .route("/login/", web::post().to(auth::login))
            .route("/me/", web::get().to(auth::me)),
    );
}
