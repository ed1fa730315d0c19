//! Floating Library Server - Peer-to-peer Book Lending Platform
//!
//! REST API server for the Floating Library book lending community.

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use floating_library_server::{
    api, config::AppConfig, repository::Repository, services::Services, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "floating_library_server={},tower_http=debug",
            config.logging.level
        )
        .into()
    });

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Floating Library Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);

    // Bootstrap the initial superuser when credentials are provided
    if let (Ok(email), Ok(password)) = (
        std::env::var("FLOATLIB_BOOTSTRAP_EMAIL"),
        std::env::var("FLOATLIB_BOOTSTRAP_PASSWORD"),
    ) {
        let hash = floating_library_server::services::users::hash_password(&password)
            .expect("Failed to hash bootstrap password");
        match repository
            .users
            .ensure_superuser("Administrator", &email, &hash)
            .await
            .expect("Failed to bootstrap superuser")
        {
            Some(user) => tracing::info!("Bootstrap superuser created: {}", user.email),
            None => tracing::debug!("Bootstrap superuser already present"),
        }
    }

    let services = Services::new(
        repository,
        config.auth.clone(),
        config.email.clone(),
        config.borrows.clone(),
        config.otp.clone(),
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // Peer addresses are needed by the auth rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Rate limit the public credential endpoints, keyed by peer IP
    let governor_conf = Box::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(100)
            .finish()
            .expect("Failed to build rate limiter configuration"),
    );

    let credential_routes = Router::new()
        .route("/auth/signup", post(api::auth::sign_up))
        .route("/auth/signin", post(api::auth::sign_in))
        .route("/auth/forgot-password", post(api::auth::forgot_password))
        .route("/auth/verify-otp", post(api::auth::verify_otp))
        .route("/auth/reset-password", post(api::auth::reset_password))
        .layer(GovernorLayer {
            config: Box::leak(governor_conf),
        });

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .merge(credential_routes)
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", patch(api::auth::update_profile))
        .route("/auth/change-password", post(api::auth::change_password))
        // Books (catalog)
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/mine", get(api::books::my_books))
        .route("/books/search", get(api::books::search_books))
        .route("/books/top-rated", get(api::books::top_rated_books))
        .route("/books/recent", get(api::books::recent_books))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", patch(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/books/:id/review", post(api::books::toggle_review))
        .route("/books/:id/comments", post(api::comments::add_comment))
        .route("/books/:id/borrow", post(api::borrows::create_borrow_request))
        .route("/books/:id/wishlist", post(api::wishlists::add_to_wishlist))
        .route("/books/:id/wishlist", delete(api::wishlists::remove_from_wishlist))
        // Categories
        .route("/categories", get(api::books::list_categories))
        .route("/categories/:id/books", get(api::books::books_by_category))
        // Comments
        .route("/comments/:id", patch(api::comments::edit_comment))
        .route("/comments/:id", delete(api::comments::delete_comment))
        .route("/comments/:id/vote", post(api::comments::vote_comment))
        // Wishlist
        .route("/wishlist", get(api::wishlists::list_wishlist))
        // Borrow requests
        .route("/borrow-requests", get(api::borrows::list_borrow_requests))
        .route("/lend-requests", get(api::borrows::list_lend_requests))
        .route("/borrow-requests/:id/cancel", post(api::borrows::cancel_borrow_request))
        .route("/borrow-requests/:id/accept", post(api::borrows::accept_borrow_request))
        .route("/borrow-requests/:id/reject", post(api::borrows::reject_borrow_request))
        .route("/borrow-requests/:id/return", post(api::borrows::return_borrowed_book))
        // User administration
        .route("/users", get(api::users::list_users))
        .route("/users/active", get(api::users::list_active_users))
        .route("/users/inactive", get(api::users::list_inactive_users))
        .route("/users/:id/activate", post(api::users::activate_user))
        .route("/users/:id/deactivate", patch(api::users::deactivate_user))
        .route("/users/:id/promote", patch(api::users::promote_user))
        // Statistics
        .route("/stats/dashboard", get(api::stats::dashboard_stats))
        .route("/stats/me", get(api::stats::my_stats))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
}
