//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookDetails, BookSummary, Category, CreateBook, UpdateBook},
};

use super::{AuthenticatedUser, MessageResponse};

/// Search query parameters
#[derive(Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Substring matched against title, author and category name
    pub q: Option<String>,
}

/// Rating returned after a review toggle
#[derive(Serialize, ToSchema)]
pub struct RatingResponse {
    pub rating: i32,
    /// Whether the caller's review now exists
    pub reviewed: bool,
}

/// List all books, newest first
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<BookSummary>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_details(id).await?;
    Ok(Json(book))
}

/// List a book owned by the caller
#[utoipa::path(
    get,
    path = "/books/mine",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's books", body = Vec<BookSummary>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.catalog.my_books(claims.user_id).await?;
    Ok(Json(books))
}

/// Search books by title, author or category name
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<BookSummary>),
        (status = 400, description = "Missing query"),
        (status = 404, description = "No books found")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let q = query.q.unwrap_or_default();
    let books = state.services.catalog.search(&q).await?;
    Ok(Json(books))
}

/// List books rated above 4, best first
#[utoipa::path(
    get,
    path = "/books/top-rated",
    tag = "books",
    responses(
        (status = 200, description = "Top rated books", body = Vec<BookSummary>)
    )
)]
pub async fn top_rated_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.catalog.top_rated().await?;
    Ok(Json(books))
}

/// List books by most recent update
#[utoipa::path(
    get,
    path = "/books/recent",
    tag = "books",
    responses(
        (status = 200, description = "Recently updated books", body = Vec<BookSummary>)
    )
)]
pub async fn recent_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.catalog.recently_updated().await?;
    Ok(Json(books))
}

/// Create a new book owned by the caller
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookDetails),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Account not activated")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookDetails>)> {
    claims.require_active()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state
        .services
        .catalog
        .create_book(claims.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book (owner only)
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<BookDetails>> {
    claims.require_active()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state
        .services
        .catalog
        .update_book(claims.user_id, id, request)
        .await?;
    Ok(Json(book))
}

/// Delete a book (owner only)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.catalog.delete_book(claims.user_id, id).await?;
    Ok(Json(MessageResponse::new("Book deleted successfully")))
}

/// Toggle the caller's review of a book
#[utoipa::path(
    post,
    path = "/books/{id}/review",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Review toggled", body = RatingResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn toggle_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RatingResponse>> {
    claims.require_active()?;

    let (rating, reviewed) = state
        .services
        .catalog
        .toggle_review(claims.user_id, id)
        .await?;
    Ok(Json(RatingResponse { rating, reviewed }))
}

/// List all categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "books",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>)
    )
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = state.services.catalog.list_categories().await?;
    Ok(Json(categories))
}

/// List books in a category
#[utoipa::path(
    get,
    path = "/categories/{id}/books",
    tag = "books",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Books in the category", body = Vec<BookSummary>),
        (status = 404, description = "Category not found")
    )
)]
pub async fn books_by_category(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.catalog.books_by_category(id).await?;
    Ok(Json(books))
}
