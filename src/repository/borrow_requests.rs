//! Borrow requests repository: the request lifecycle engine.
//!
//! Check-then-write sequences (create, accept) run inside a transaction with
//! the book row locked, so two concurrent calls against the same book
//! serialize. The partial unique indexes on borrow_requests are the backstop:
//! a violation is translated to the matching conflict error.

use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookSummary,
        borrow_request::{is_late_at, return_date_for, BorrowRequest, BorrowRequestDetails},
        user::UserBrief,
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT br.id, br.status, br.created_at, br.accepted_at, br.return_date, br.is_late,
           b.id as book_id, b.title as book_title, b.author as book_author,
           b.image_url as book_image_url, b.rating as book_rating,
           r.id as requester_id, r.name as requester_name, r.email as requester_email,
           o.id as owner_id, o.name as owner_name, o.email as owner_email
    FROM borrow_requests br
    JOIN books b ON br.book_id = b.id
    JOIN users r ON br.requester_id = r.id
    JOIN users o ON br.owner_id = o.id
"#;

fn details_from_row(row: &PgRow) -> BorrowRequestDetails {
    BorrowRequestDetails {
        id: row.get("id"),
        status: row.get("status"),
        book: BookSummary {
            id: row.get("book_id"),
            title: row.get("book_title"),
            author: row.get("book_author"),
            image_url: row.get("book_image_url"),
            rating: row.get("book_rating"),
        },
        requester: UserBrief {
            id: row.get("requester_id"),
            name: row.get("requester_name"),
            email: row.get("requester_email"),
        },
        owner: UserBrief {
            id: row.get("owner_id"),
            name: row.get("owner_name"),
            email: row.get("owner_email"),
        },
        created_at: row.get("created_at"),
        accepted_at: row.get("accepted_at"),
        return_date: row.get("return_date"),
        is_late: row.get("is_late"),
    }
}

/// Translate a partial-unique-index violation into the matching domain error
fn map_constraint_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.constraint() {
            Some("uq_borrow_requests_accepted_book") => return AppError::BookUnavailable,
            Some("uq_borrow_requests_pending_requester_book") => {
                return AppError::DuplicateRequest
            }
            _ => {}
        }
    }
    AppError::Database(err)
}

#[derive(Clone)]
pub struct BorrowRequestsRepository {
    pool: Pool<Postgres>,
}

impl BorrowRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))
    }

    /// Get borrow request with embedded book and user summaries
    pub async fn details(&self, id: i32) -> AppResult<BorrowRequestDetails> {
        let row = sqlx::query(&format!("{} WHERE br.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))?;

        Ok(details_from_row(&row))
    }

    /// Create a PENDING request for a book.
    ///
    /// Owner is denormalized from the book inside the same transaction that
    /// validates self-borrow, the borrow limit, availability and pending
    /// duplicates.
    pub async fn create(
        &self,
        requester_id: i32,
        book_id: i32,
        max_active_borrows: u32,
    ) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let book_owner: i32 =
            sqlx::query_scalar("SELECT owner_id FROM books WHERE id = $1 FOR UPDATE")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if book_owner == requester_id {
            return Err(AppError::SelfBorrow);
        }

        let accepted_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_requests WHERE requester_id = $1 AND status = 'ACCEPTED'",
        )
        .bind(requester_id)
        .fetch_one(&mut *tx)
        .await?;

        if accepted_count >= max_active_borrows as i64 {
            return Err(AppError::BorrowLimitReached(max_active_borrows));
        }

        let book_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_requests WHERE book_id = $1 AND status = 'ACCEPTED')",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if book_taken {
            return Err(AppError::BookUnavailable);
        }

        let already_pending: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrow_requests
                WHERE requester_id = $1 AND book_id = $2 AND status = 'PENDING'
            )
            "#,
        )
        .bind(requester_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_pending {
            return Err(AppError::DuplicateRequest);
        }

        let request = sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests (requester_id, owner_id, book_id, status)
            VALUES ($1, $2, $3, 'PENDING')
            RETURNING *
            "#,
        )
        .bind(requester_id)
        .bind(book_owner)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_constraint_violation)?;

        tx.commit().await?;
        Ok(request)
    }

    /// Cancel a PENDING request. Only the requester may cancel.
    pub async fn cancel(&self, requester_id: i32, request_id: i32) -> AppResult<BorrowRequest> {
        let request = self.get_by_id(request_id).await?;

        if request.requester_id != requester_id {
            return Err(AppError::Authorization(
                "You are not authorized to cancel this request".to_string(),
            ));
        }
        if !request.status.can_cancel() {
            return Err(AppError::InvalidState(
                "This request has already been processed".to_string(),
            ));
        }

        // Status guard in the WHERE clause: a concurrent transition loses here
        sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests SET status = 'CANCELLED'
            WHERE id = $1 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::InvalidState("This request has already been processed".to_string())
        })
    }

    /// Accept a PENDING request: only the owner, only while the book has no
    /// other ACCEPTED request. Flips requester/owner role flags in the same
    /// transaction.
    pub async fn accept(
        &self,
        owner_id: i32,
        request_id: i32,
        loan_period_days: i64,
    ) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", request_id)))?;

        if request.owner_id != owner_id {
            return Err(AppError::Authorization(
                "You are not authorized to accept this request".to_string(),
            ));
        }
        if !request.status.can_decide() {
            return Err(AppError::InvalidState(
                "This request has already been processed".to_string(),
            ));
        }

        // Serialize against concurrent accepts and creates for the same book
        sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(request.book_id)
            .execute(&mut *tx)
            .await?;

        let book_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_requests WHERE book_id = $1 AND status = 'ACCEPTED')",
        )
        .bind(request.book_id)
        .fetch_one(&mut *tx)
        .await?;

        if book_taken {
            return Err(AppError::BookUnavailable);
        }

        let now = Utc::now();
        let due = return_date_for(now, loan_period_days);

        let updated = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'ACCEPTED', accepted_at = $2, return_date = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(now)
        .bind(due)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_constraint_violation)?;

        sqlx::query("UPDATE users SET is_borrower = TRUE, updated_at = $2 WHERE id = $1")
            .bind(request.requester_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET is_lender = TRUE, updated_at = $2 WHERE id = $1")
            .bind(request.owner_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Reject a PENDING request. Only the owner may reject.
    pub async fn reject(&self, owner_id: i32, request_id: i32) -> AppResult<BorrowRequest> {
        let request = self.get_by_id(request_id).await?;

        if request.owner_id != owner_id {
            return Err(AppError::Authorization(
                "You are not authorized to reject this request".to_string(),
            ));
        }
        if !request.status.can_decide() {
            return Err(AppError::InvalidState(
                "This request has already been processed".to_string(),
            ));
        }

        sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests SET status = 'REJECTED'
            WHERE id = $1 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::InvalidState("This request has already been processed".to_string())
        })
    }

    /// Return an ACCEPTED book. Marks the request late when past its due
    /// date and clears the requester's borrower flag once no ACCEPTED
    /// request remains, all in one transaction.
    pub async fn return_book(&self, requester_id: i32, request_id: i32) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", request_id)))?;

        if request.requester_id != requester_id {
            return Err(AppError::Authorization(
                "You are not authorized to return this book".to_string(),
            ));
        }
        if !request.status.can_return() {
            return Err(AppError::InvalidState(
                "Only an accepted request can be returned".to_string(),
            ));
        }

        let now = Utc::now();
        let late = is_late_at(now, request.return_date);

        let updated = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests SET status = 'RETURNED', is_late = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(late)
        .fetch_one(&mut *tx)
        .await?;

        let still_borrowing: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_requests WHERE requester_id = $1 AND status = 'ACCEPTED')",
        )
        .bind(requester_id)
        .fetch_one(&mut *tx)
        .await?;

        if !still_borrowing {
            sqlx::query("UPDATE users SET is_borrower = FALSE, updated_at = $2 WHERE id = $1")
                .bind(requester_id)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Borrow history: requests sent by a user, newest first
    pub async fn list_by_requester(&self, user_id: i32) -> AppResult<Vec<BorrowRequestDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE br.requester_id = $1 ORDER BY br.created_at DESC",
            DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Lend history: requests received by a book owner, newest first
    pub async fn list_by_owner(&self, user_id: i32) -> AppResult<Vec<BorrowRequestDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE br.owner_id = $1 ORDER BY br.created_at DESC",
            DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Number of books a user currently has on loan
    pub async fn count_borrowed(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_requests WHERE requester_id = $1 AND status = 'ACCEPTED'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Number of books a user currently has lent out
    pub async fn count_lent(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_requests WHERE owner_id = $1 AND status = 'ACCEPTED'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
