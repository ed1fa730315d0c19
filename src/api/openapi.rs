//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, comments, health, stats, users, wishlists};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Floating Library API",
        version = "0.3.0",
        description = "Peer-to-peer book lending platform REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::sign_up,
        auth::sign_in,
        auth::me,
        auth::update_profile,
        auth::change_password,
        auth::forgot_password,
        auth::verify_otp,
        auth::reset_password,
        // Books
        books::list_books,
        books::get_book,
        books::my_books,
        books::search_books,
        books::top_rated_books,
        books::recent_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::toggle_review,
        books::list_categories,
        books::books_by_category,
        // Borrows
        borrows::create_borrow_request,
        borrows::cancel_borrow_request,
        borrows::accept_borrow_request,
        borrows::reject_borrow_request,
        borrows::return_borrowed_book,
        borrows::list_borrow_requests,
        borrows::list_lend_requests,
        // Comments
        comments::add_comment,
        comments::edit_comment,
        comments::delete_comment,
        comments::vote_comment,
        // Wishlist
        wishlists::add_to_wishlist,
        wishlists::list_wishlist,
        wishlists::remove_from_wishlist,
        // Users
        users::list_users,
        users::list_active_users,
        users::list_inactive_users,
        users::activate_user,
        users::deactivate_user,
        users::promote_user,
        // Stats
        stats::dashboard_stats,
        stats::my_stats,
    ),
    components(
        schemas(
            // Auth
            auth::SignInRequest,
            auth::SignInResponse,
            auth::UserInfo,
            auth::ForgotPasswordRequest,
            auth::VerifyOtpRequest,
            auth::ResetPasswordRequest,
            // Users
            crate::models::user::User,
            crate::models::user::UserBrief,
            crate::models::user::Role,
            crate::models::user::SignUp,
            crate::models::user::UpdateProfile,
            crate::models::user::ChangePassword,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookDetails,
            crate::models::book::Category,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::RatingResponse,
            // Borrows
            crate::models::borrow_request::BorrowRequest,
            crate::models::borrow_request::BorrowRequestDetails,
            crate::models::borrow_request::BorrowStatus,
            // Comments
            crate::models::comment::Comment,
            crate::models::comment::CommentNode,
            crate::models::comment::CreateComment,
            crate::models::comment::UpdateComment,
            crate::models::comment::VoteKind,
            crate::models::comment::VoteRequest,
            crate::models::comment::VoteTally,
            // Wishlist
            crate::models::wishlist::WishlistEntry,
            crate::models::wishlist::WishlistItem,
            // Stats
            crate::services::stats::DashboardStats,
            crate::services::stats::UserStats,
            // Health
            health::HealthResponse,
            // Shared
            crate::api::MessageResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and password reset"),
        (name = "books", description = "Book catalog"),
        (name = "borrows", description = "Borrow request lifecycle"),
        (name = "comments", description = "Comments and votes"),
        (name = "wishlist", description = "Saved-for-later books"),
        (name = "users", description = "User administration"),
        (name = "stats", description = "Counts and dashboards")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
