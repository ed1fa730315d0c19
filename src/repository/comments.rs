//! Comments and votes repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::comment::{vote_deltas, Comment, VoteAction, VoteKind, VoteTally},
};

#[derive(Clone)]
pub struct CommentsRepository {
    pool: Pool<Postgres>,
}

impl CommentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get comment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Comment> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment with id {} not found", id)))
    }

    /// Create a comment, optionally as a reply. A reply's parent must belong
    /// to the same book.
    pub async fn create(
        &self,
        user_id: i32,
        book_id: i32,
        content: &str,
        parent_id: Option<i32>,
    ) -> AppResult<Comment> {
        if let Some(parent) = parent_id {
            let parent_book: i32 =
                sqlx::query_scalar("SELECT book_id FROM comments WHERE id = $1")
                    .bind(parent)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Comment with id {} not found", parent))
                    })?;
            if parent_book != book_id {
                return Err(AppError::Validation(
                    "Parent comment belongs to a different book".to_string(),
                ));
            }
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (user_id, book_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(parent_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Replace a comment's content
    pub async fn update(&self, id: i32, content: &str) -> AppResult<Comment> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment with id {} not found", id)))
    }

    /// Delete a comment (replies cascade)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment with id {} not found", id)));
        }
        Ok(())
    }

    /// Apply a vote: toggle off on repeat, flip on opposite, insert on first.
    ///
    /// The vote row and the denormalized counters move in one transaction
    /// with the comment row locked, so the tallies stay consistent with the
    /// comment_votes table.
    pub async fn vote(
        &self,
        user_id: i32,
        comment_id: i32,
        incoming: VoteKind,
    ) -> AppResult<(VoteAction, VoteTally)> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM comments WHERE id = $1 FOR UPDATE")
            .bind(comment_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Comment with id {} not found", comment_id))
            })?;

        let existing: Option<VoteKind> = sqlx::query_scalar(
            "SELECT vote FROM comment_votes WHERE user_id = $1 AND comment_id = $2",
        )
        .bind(user_id)
        .bind(comment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = vote_deltas(existing, incoming);

        match outcome.action {
            VoteAction::Removed => {
                sqlx::query("DELETE FROM comment_votes WHERE user_id = $1 AND comment_id = $2")
                    .bind(user_id)
                    .bind(comment_id)
                    .execute(&mut *tx)
                    .await?;
            }
            VoteAction::Switched => {
                sqlx::query(
                    r#"
                    UPDATE comment_votes SET vote = $3, updated_at = $4
                    WHERE user_id = $1 AND comment_id = $2
                    "#,
                )
                .bind(user_id)
                .bind(comment_id)
                .bind(incoming)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
            }
            VoteAction::Created => {
                sqlx::query(
                    "INSERT INTO comment_votes (user_id, comment_id, vote) VALUES ($1, $2, $3)",
                )
                .bind(user_id)
                .bind(comment_id)
                .bind(incoming)
                .execute(&mut *tx)
                .await?;
            }
        }

        let row: (i32, i32) = sqlx::query_as(
            r#"
            UPDATE comments
            SET upvotes = upvotes + $2, downvotes = downvotes + $3
            WHERE id = $1
            RETURNING upvotes, downvotes
            "#,
        )
        .bind(comment_id)
        .bind(outcome.upvote_delta)
        .bind(outcome.downvote_delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((
            outcome.action,
            VoteTally {
                upvotes: row.0,
                downvotes: row.1,
            },
        ))
    }
}
