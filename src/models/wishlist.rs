//! Wishlist model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::BookSummary;

/// Wishlist entry from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WishlistEntry {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub added_at: DateTime<Utc>,
}

/// Wishlist entry with the saved book embedded
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WishlistItem {
    pub id: i32,
    pub book: BookSummary,
    pub added_at: DateTime<Utc>,
}
