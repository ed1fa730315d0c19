//! Borrow request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{error::AppResult, models::borrow_request::BorrowRequestDetails};

use super::AuthenticatedUser;

/// Request to borrow a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 201, description = "Borrow request created", body = BorrowRequestDetails),
        (status = 400, description = "Self-borrow, limit reached, unavailable or duplicate"),
        (status = 403, description = "Account not activated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_borrow_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<(StatusCode, Json<BorrowRequestDetails>)> {
    claims.require_active()?;

    let request = state
        .services
        .borrows
        .create(claims.user_id, book_id)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Cancel a pending borrow request (requester only)
#[utoipa::path(
    post,
    path = "/borrow-requests/{id}/cancel",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = BorrowRequestDetails),
        (status = 400, description = "Request is not pending"),
        (status = 403, description = "Not the requester"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn cancel_borrow_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<BorrowRequestDetails>> {
    claims.require_active()?;

    let request = state
        .services
        .borrows
        .cancel(claims.user_id, request_id)
        .await?;
    Ok(Json(request))
}

/// Accept a pending borrow request (owner only)
#[utoipa::path(
    post,
    path = "/borrow-requests/{id}/accept",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    responses(
        (status = 200, description = "Request accepted", body = BorrowRequestDetails),
        (status = 400, description = "Request is not pending or book unavailable"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn accept_borrow_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<BorrowRequestDetails>> {
    claims.require_active()?;

    let request = state
        .services
        .borrows
        .accept(claims.user_id, request_id)
        .await?;
    Ok(Json(request))
}

/// Reject a pending borrow request (owner only)
#[utoipa::path(
    post,
    path = "/borrow-requests/{id}/reject",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    responses(
        (status = 200, description = "Request rejected", body = BorrowRequestDetails),
        (status = 400, description = "Request is not pending"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn reject_borrow_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<BorrowRequestDetails>> {
    claims.require_active()?;

    let request = state
        .services
        .borrows
        .reject(claims.user_id, request_id)
        .await?;
    Ok(Json(request))
}

/// Return a borrowed book (requester only)
#[utoipa::path(
    post,
    path = "/borrow-requests/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    responses(
        (status = 200, description = "Book returned", body = BorrowRequestDetails),
        (status = 400, description = "Request is not accepted"),
        (status = 403, description = "Not the requester"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn return_borrowed_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<BorrowRequestDetails>> {
    claims.require_active()?;

    let request = state
        .services
        .borrows
        .return_book(claims.user_id, request_id)
        .await?;
    Ok(Json(request))
}

/// Borrow history: requests the caller has sent
#[utoipa::path(
    get,
    path = "/borrow-requests",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Requests sent by the caller", body = Vec<BorrowRequestDetails>)
    )
)]
pub async fn list_borrow_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRequestDetails>>> {
    claims.require_active()?;

    let requests = state.services.borrows.borrow_history(claims.user_id).await?;
    Ok(Json(requests))
}

/// Lend history: requests received for the caller's books
#[utoipa::path(
    get,
    path = "/lend-requests",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Requests received by the caller", body = Vec<BorrowRequestDetails>)
    )
)]
pub async fn list_lend_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRequestDetails>>> {
    claims.require_active()?;

    let requests = state.services.borrows.lend_history(claims.user_id).await?;
    Ok(Json(requests))
}
