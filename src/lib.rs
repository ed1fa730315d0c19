//! Floating Library
//!
//! A peer-to-peer book lending platform: users list books they own and
//! request to borrow books from each other, with a REST JSON API covering
//! the catalog, borrow-request lifecycle, comments, wishlists and accounts.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
