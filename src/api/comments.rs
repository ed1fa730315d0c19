//! Comment and vote endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::comment::{Comment, CreateComment, UpdateComment, VoteRequest, VoteTally},
};

use super::{AuthenticatedUser, MessageResponse};
use validator::Validate;

/// Add a comment (or reply) to a book
#[utoipa::path(
    post,
    path = "/books/{id}/comments",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn add_comment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    claims.require_active()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = state
        .services
        .comments
        .add(claims.user_id, book_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Edit a comment (author only)
#[utoipa::path(
    patch,
    path = "/comments/{id}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = UpdateComment,
    responses(
        (status = 200, description = "Comment updated", body = Comment),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn edit_comment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(comment_id): Path<i32>,
    Json(request): Json<UpdateComment>,
) -> AppResult<Json<Comment>> {
    claims.require_active()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = state
        .services
        .comments
        .edit(claims.user_id, comment_id, request)
        .await?;
    Ok(Json(comment))
}

/// Delete a comment (author only)
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn delete_comment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(comment_id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    claims.require_active()?;

    state
        .services
        .comments
        .delete(claims.user_id, comment_id)
        .await?;
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}

/// Vote on a comment. Re-sending the same direction removes the vote;
/// the opposite direction flips it.
#[utoipa::path(
    post,
    path = "/comments/{id}/vote",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Current tallies", body = VoteTally),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn vote_comment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(comment_id): Path<i32>,
    Json(request): Json<VoteRequest>,
) -> AppResult<Json<VoteTally>> {
    claims.require_active()?;

    let (_action, tally) = state
        .services
        .comments
        .vote(claims.user_id, comment_id, request.vote)
        .await?;
    Ok(Json(tally))
}
