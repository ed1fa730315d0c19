//! Books and categories repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{slugify, Book, BookDetails, BookSummary, Category, CreateBook, UpdateBook},
        comment::{assemble_tree, FlatComment},
        user::UserBrief,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get or create a category by its normalized name
    pub async fn ensure_category(&self, name: &str) -> AppResult<Category> {
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(AppError::Validation("Category name cannot be empty".to_string()));
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(&normalized)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Derive a slug from the title, resolving collisions with a numeric suffix
    async fn unique_slug(&self, title: &str) -> AppResult<String> {
        let base = {
            let s = slugify(title);
            if s.is_empty() { "book".to_string() } else { s }
        };

        let mut slug = base.clone();
        let mut counter = 1;
        loop {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE slug = $1)")
                    .bind(&slug)
                    .fetch_one(&self.pool)
                    .await?;
            if !taken {
                return Ok(slug);
            }
            slug = format!("{}-{}", base, counter);
            counter += 1;
        }
    }

    /// Create a book owned by `owner_id`
    pub async fn create(
        &self,
        owner_id: i32,
        book: &CreateBook,
        category_id: Option<i32>,
    ) -> AppResult<Book> {
        let slug = self.unique_slug(&book.title).await?;

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books
                (title, author, category_id, owner_id, image_url, language,
                 short_description, published_date, slug)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(category_id)
        .bind(owner_id)
        .bind(book.image_url.as_deref())
        .bind(&book.language)
        .bind(book.short_description.as_deref())
        .bind(book.published_date)
        .bind(&slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Partially update a book. The slug is kept stable across title edits.
    pub async fn update(
        &self,
        id: i32,
        book: &UpdateBook,
        category_id: Option<i32>,
    ) -> AppResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                category_id = COALESCE($4, category_id),
                image_url = COALESCE($5, image_url),
                language = COALESCE($6, language),
                short_description = COALESCE($7, short_description),
                published_date = COALESCE($8, published_date),
                updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(book.title.as_deref())
        .bind(book.author.as_deref())
        .bind(category_id)
        .bind(book.image_url.as_deref())
        .bind(book.language.as_deref())
        .bind(book.short_description.as_deref())
        .bind(book.published_date)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(updated)
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Full details for one book: owner, category, availability, comment tree
    pub async fn details(&self, id: i32) -> AppResult<BookDetails> {
        let row = sqlx::query(
            r#"
            SELECT b.*,
                   u.name as owner_name, u.email as owner_email,
                   c.name as category_name,
                   NOT EXISTS(
                       SELECT 1 FROM borrow_requests br
                       WHERE br.book_id = b.id AND br.status = 'ACCEPTED'
                   ) as is_available
            FROM books b
            JOIN users u ON b.owner_id = u.id
            LEFT JOIN categories c ON b.category_id = c.id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let comment_rows = sqlx::query(
            r#"
            SELECT cm.id, cm.content, cm.parent_id, cm.upvotes, cm.downvotes,
                   cm.created_at, u.name as user_name
            FROM comments cm
            JOIN users u ON cm.user_id = u.id
            WHERE cm.book_id = $1
            ORDER BY cm.created_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let flat: Vec<FlatComment> = comment_rows
            .iter()
            .map(|r| FlatComment {
                id: r.get("id"),
                user: r.get("user_name"),
                content: r.get("content"),
                parent_id: r.get("parent_id"),
                upvotes: r.get("upvotes"),
                downvotes: r.get("downvotes"),
                created_at: r.get("created_at"),
            })
            .collect();

        let category = match (
            row.get::<Option<i32>, _>("category_id"),
            row.get::<Option<String>, _>("category_name"),
        ) {
            (Some(id), Some(name)) => Some(Category { id, name }),
            _ => None,
        };

        Ok(BookDetails {
            id: row.get("id"),
            title: row.get("title"),
            author: row.get("author"),
            slug: row.get("slug"),
            language: row.get("language"),
            image_url: row.get("image_url"),
            short_description: row.get("short_description"),
            published_date: row.get("published_date"),
            rating: row.get("rating"),
            category,
            owner: UserBrief {
                id: row.get("owner_id"),
                name: row.get("owner_name"),
                email: row.get("owner_email"),
            },
            comments: assemble_tree(flat),
            is_available: row.get("is_available"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    const SUMMARY_SELECT: &'static str =
        "SELECT id, title, author, image_url, rating FROM books";

    /// List every book, newest first
    pub async fn list_all(&self) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(&format!(
            "{} ORDER BY created_at DESC",
            Self::SUMMARY_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// List books owned by a user, newest first
    pub async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(&format!(
            "{} WHERE owner_id = $1 ORDER BY created_at DESC",
            Self::SUMMARY_SELECT
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// List books in a category, newest first
    pub async fn list_by_category(&self, category_id: i32) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(&format!(
            "{} WHERE category_id = $1 ORDER BY created_at DESC",
            Self::SUMMARY_SELECT
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// List books by most recent update
    pub async fn list_recently_updated(&self) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(&format!(
            "{} ORDER BY updated_at DESC NULLS LAST, created_at DESC",
            Self::SUMMARY_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Case-insensitive substring search over title, author and category name
    pub async fn search(&self, query: &str) -> AppResult<Vec<BookSummary>> {
        let pattern = format!("%{}%", query);
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT DISTINCT b.id, b.title, b.author, b.image_url, b.rating, b.created_at
            FROM books b
            LEFT JOIN categories c ON b.category_id = c.id
            WHERE b.title ILIKE $1 OR b.author ILIKE $1 OR c.name ILIKE $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Books rated above 4, best first
    pub async fn top_rated(&self) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(&format!(
            "{} WHERE rating > 4 ORDER BY rating DESC",
            Self::SUMMARY_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// List all categories
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    /// Get category by ID
    pub async fn get_category(&self, id: i32) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// Toggle the caller's review of a book.
    ///
    /// The review row and the denormalized rating move together in one
    /// transaction: insert increments, delete decrements. Returns the new
    /// rating and whether a review now exists.
    pub async fn toggle_review(&self, book_id: i32, reviewer_id: i32) -> AppResult<(i32, bool)> {
        let mut tx = self.pool.begin().await?;

        // Lock the book row so the counter moves with exactly one toggle
        sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM book_reviews WHERE book_id = $1 AND reviewer_id = $2",
        )
        .bind(book_id)
        .bind(reviewer_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (rating, reviewed) = match existing {
            Some(review_id) => {
                sqlx::query("DELETE FROM book_reviews WHERE id = $1")
                    .bind(review_id)
                    .execute(&mut *tx)
                    .await?;
                let rating: i32 = sqlx::query_scalar(
                    "UPDATE books SET rating = rating - 1 WHERE id = $1 RETURNING rating",
                )
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;
                (rating, false)
            }
            None => {
                sqlx::query("INSERT INTO book_reviews (book_id, reviewer_id) VALUES ($1, $2)")
                    .bind(book_id)
                    .bind(reviewer_id)
                    .execute(&mut *tx)
                    .await?;
                let rating: i32 = sqlx::query_scalar(
                    "UPDATE books SET rating = rating + 1 WHERE id = $1 RETURNING rating",
                )
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;
                (rating, true)
            }
        };

        tx.commit().await?;
        Ok((rating, reviewed))
    }

    /// Number of books a user owns
    pub async fn count_by_owner(&self, owner_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
