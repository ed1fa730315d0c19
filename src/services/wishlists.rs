//! Wishlist service

use crate::{
    error::AppResult,
    models::wishlist::{WishlistEntry, WishlistItem},
    repository::Repository,
};

#[derive(Clone)]
pub struct WishlistsService {
    repository: Repository,
}

impl WishlistsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Save a book for later. Adding twice keeps the original entry.
    pub async fn add(&self, user_id: i32, book_id: i32) -> AppResult<WishlistEntry> {
        // 404 on unknown book
        self.repository.books.get_by_id(book_id).await?;
        self.repository.wishlists.add(user_id, book_id).await
    }

    /// The caller's wishlist, newest first
    pub async fn list(&self, user_id: i32) -> AppResult<Vec<WishlistItem>> {
        self.repository.wishlists.list(user_id).await
    }

    /// Remove a saved book
    pub async fn remove(&self, user_id: i32, book_id: i32) -> AppResult<()> {
        // 404 on unknown book, matching the add path
        self.repository.books.get_by_id(book_id).await?;
        self.repository.wishlists.remove(user_id, book_id).await
    }
}
