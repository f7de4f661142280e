//! Post detail, creation, editing and deletion.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use blogicum_core::domain::{Post, PostDraft};
use blogicum_core::policy::{Operation, Target, authorize, can_view, require_login};
use blogicum_shared::dto::{PostDetailResponse, PostRequest};

use super::{deny, parse_body, views};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult, field_messages};
use crate::state::AppState;

/// GET /posts/{id}/
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let summary = state
        .posts
        .find_summary(post_id)
        .await?
        .filter(|s| can_view(identity.viewer(), &s.post, s.category.as_ref(), Utc::now()))
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comments = state
        .comments
        .list_for_post(post_id)
        .await?
        .into_iter()
        .map(views::comment)
        .collect();

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: views::post(summary),
        comments,
    }))
}

/// POST /posts/create/
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let author_id = require_login(identity.viewer()).map_err(|r| deny(r, &req))?;
    let draft = draft(&state, parse_body(&body)?).await?;

    let post = state.posts.insert(Post::new(author_id, draft)).await?;
    tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");

    let summary = state
        .posts
        .find_summary(post.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Created().json(views::post(summary)))
}

/// POST /posts/{id}/edit/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    require_login(viewer).map_err(|r| deny(r, &req))?;

    let mut post = find_post(&state, path.into_inner()).await?;
    authorize(viewer, Target::Post(&post), Operation::Edit)
        .into_result()
        .map_err(|r| deny(r, &req))?;

    let request: PostRequest = parse_body(&body)?;
    post.apply(draft(&state, request).await?);
    let post = state.posts.update(post).await?;
    tracing::info!(post_id = %post.id, "Post updated");

    let summary = state
        .posts
        .find_summary(post.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(views::post(summary)))
}

/// POST /posts/{id}/delete/
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    require_login(viewer).map_err(|r| deny(r, &req))?;

    let post = find_post(&state, path.into_inner()).await?;
    authorize(viewer, Target::Post(&post), Operation::Delete)
        .into_result()
        .map_err(|r| deny(r, &req))?;

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}

async fn find_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

/// Validate a submitted post, including that its references exist.
async fn draft(state: &AppState, request: PostRequest) -> AppResult<PostDraft> {
    let mut errors = match request.validate() {
        Ok(()) => Default::default(),
        Err(e) => field_messages(&e),
    };

    if let Some(category_id) = request.category_id {
        if state.categories.find_by_id(category_id).await?.is_none() {
            errors
                .entry("category_id".to_string())
                .or_insert_with(Vec::new)
                .push("Select a valid category".to_string());
        }
    }
    if let Some(location_id) = request.location_id {
        if state.locations.find_by_id(location_id).await?.is_none() {
            errors
                .entry("location_id".to_string())
                .or_insert_with(Vec::new)
                .push("Select a valid location".to_string());
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(PostDraft {
        title: request.title,
        text: request.text,
        image: request.image,
        pub_date: request.pub_date.unwrap_or_else(Utc::now),
        location_id: request.location_id,
        category_id: request.category_id,
        is_published: request.is_published,
    })
}
