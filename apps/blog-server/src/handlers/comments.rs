//! Comments on posts.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use blogicum_core::domain::{Comment, CommentSummary};
use blogicum_core::policy::{Operation, Target, authorize, can_view, require_login};
use blogicum_shared::dto::CommentRequest;

use super::{deny, parse_body, views};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /posts/{id}/comment/
pub async fn add(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    let author_id = require_login(viewer).map_err(|r| deny(r, &req))?;

    let post_id = path.into_inner();
    state
        .posts
        .find_summary(post_id)
        .await?
        .filter(|s| can_view(viewer, &s.post, s.category.as_ref(), Utc::now()))
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let request: CommentRequest = parse_body(&body)?;
    request.validate()?;

    let comment = state
        .comments
        .insert(Comment::new(post_id, author_id, request.text))
        .await?;
    tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment added");

    let summary = with_author(&state, comment).await?;
    Ok(HttpResponse::Created().json(views::comment(summary)))
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    require_login(viewer).map_err(|r| deny(r, &req))?;

    let (post_id, comment_id) = path.into_inner();
    let mut comment = find_comment(&state, post_id, comment_id).await?;
    authorize(viewer, Target::Comment(&comment), Operation::Edit)
        .into_result()
        .map_err(|r| deny(r, &req))?;

    let request: CommentRequest = parse_body(&body)?;
    request.validate()?;

    comment.set_text(request.text);
    let comment = state.comments.update(comment).await?;
    tracing::info!(comment_id = %comment.id, "Comment updated");

    let summary = with_author(&state, comment).await?;
    Ok(HttpResponse::Ok().json(views::comment(summary)))
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    require_login(viewer).map_err(|r| deny(r, &req))?;

    let (post_id, comment_id) = path.into_inner();
    let comment = find_comment(&state, post_id, comment_id).await?;
    authorize(viewer, Target::Comment(&comment), Operation::Delete)
        .into_result()
        .map_err(|r| deny(r, &req))?;

    state.comments.delete(comment.id).await?;
    tracing::info!(comment_id = %comment.id, "Comment deleted");

    Ok(HttpResponse::NoContent().finish())
}

/// A comment addressed through a different post does not exist.
async fn find_comment(state: &AppState, post_id: Uuid, comment_id: Uuid) -> AppResult<Comment> {
    state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|c| c.post_id == post_id)
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
}

async fn with_author(state: &AppState, comment: Comment) -> AppResult<CommentSummary> {
    let author = state
        .users
        .find_by_id(comment.author_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(CommentSummary {
        comment,
        author_username: author.username,
    })
}
