//! Wishlist endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::wishlist::{WishlistEntry, WishlistItem},
};

use super::{AuthenticatedUser, MessageResponse};

/// Add a book to the caller's wishlist
#[utoipa::path(
    post,
    path = "/books/{id}/wishlist",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 201, description = "Book added to wishlist", body = WishlistEntry),
        (status = 404, description = "Book not found")
    )
)]
pub async fn add_to_wishlist(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<(StatusCode, Json<WishlistEntry>)> {
    claims.require_active()?;

    let entry = state
        .services
        .wishlists
        .add(claims.user_id, book_id)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// List the caller's wishlist
#[utoipa::path(
    get,
    path = "/wishlist",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Saved books", body = Vec<WishlistItem>)
    )
)]
pub async fn list_wishlist(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<WishlistItem>>> {
    claims.require_active()?;

    let items = state.services.wishlists.list(claims.user_id).await?;
    Ok(Json(items))
}

/// Remove a book from the caller's wishlist
#[utoipa::path(
    delete,
    path = "/books/{id}/wishlist",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book removed from wishlist", body = MessageResponse),
        (status = 404, description = "Book not in wishlist")
    )
)]
pub async fn remove_from_wishlist(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    claims.require_active()?;

    state
        .services
        .wishlists
        .remove(claims.user_id, book_id)
        .await?;
    Ok(Json(MessageResponse::new("Book removed from wishlist")))
}
