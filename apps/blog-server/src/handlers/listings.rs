//! Index, category and profile listings.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::policy::{Listing, ListingContext};
use blogicum_shared::dto::{ListingResponse, PageQuery};

use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

async fn render(
    state: &AppState,
    identity: &OptionalIdentity,
    listing: Listing,
    query: &PageQuery,
) -> AppResult<HttpResponse> {
    let assembled = state
        .listings
        .assemble(identity.viewer(), listing, query.page.unwrap_or(1), Utc::now())
        .await?;

    let (category, profile) = match &assembled.context {
        ListingContext::Index => (None, None),
        ListingContext::Category(category) => (Some(views::category(category)), None),
        ListingContext::Profile(user) => (None, Some(views::profile(user))),
    };

    Ok(HttpResponse::Ok().json(ListingResponse {
        category,
        profile,
        posts: views::posts(assembled.page),
    }))
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    render(&state, &identity, Listing::Index, &query).await
}

/// GET /category/{slug}/
pub async fn category(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let listing = Listing::Category {
        slug: slug.into_inner(),
    };
    render(&state, &identity, listing, &query).await
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let listing = Listing::Profile {
        username: username.into_inner(),
    };
    render(&state, &identity, listing, &query).await
}
