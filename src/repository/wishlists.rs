//! Wishlists repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookSummary,
        wishlist::{WishlistEntry, WishlistItem},
    },
};

#[derive(Clone)]
pub struct WishlistsRepository {
    pool: Pool<Postgres>,
}

impl WishlistsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Add a book to a user's wishlist. Idempotent: re-adding keeps the
    /// original entry.
    pub async fn add(&self, user_id: i32, book_id: i32) -> AppResult<WishlistEntry> {
        let entry = sqlx::query_as::<_, WishlistEntry>(
            r#"
            INSERT INTO wishlists (user_id, book_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, book_id) DO UPDATE SET book_id = EXCLUDED.book_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// List a user's wishlist with book summaries, newest first
    pub async fn list(&self, user_id: i32) -> AppResult<Vec<WishlistItem>> {
        let rows = sqlx::query(
            r#"
            SELECT w.id, w.added_at,
                   b.id as book_id, b.title, b.author, b.image_url, b.rating
            FROM wishlists w
            JOIN books b ON w.book_id = b.id
            WHERE w.user_id = $1
            ORDER BY w.added_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| WishlistItem {
                id: row.get("id"),
                book: BookSummary {
                    id: row.get("book_id"),
                    title: row.get("title"),
                    author: row.get("author"),
                    image_url: row.get("image_url"),
                    rating: row.get("rating"),
                },
                added_at: row.get("added_at"),
            })
            .collect())
    }

    /// Remove a book from a user's wishlist
    pub async fn remove(&self, user_id: i32, book_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM wishlists WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found in wishlist".to_string()));
        }
        Ok(())
    }
}
