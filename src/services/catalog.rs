//! Catalog service: books, categories and review toggles

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDetails, BookSummary, Category, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a book owned by the caller. Unknown categories are created on
    /// the fly from their normalized name.
    pub async fn create_book(&self, owner_id: i32, book: CreateBook) -> AppResult<BookDetails> {
        let category_id = match book.category.as_deref() {
            Some(name) => Some(self.repository.books.ensure_category(name).await?.id),
            None => None,
        };

        let created = self.repository.books.create(owner_id, &book, category_id).await?;
        tracing::info!("Book created: '{}' (id {})", created.title, created.id);
        self.repository.books.details(created.id).await
    }

    /// Update a book. Only the owner may edit.
    pub async fn update_book(
        &self,
        user_id: i32,
        book_id: i32,
        update: UpdateBook,
    ) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(book_id).await?;
        if book.owner_id != user_id {
            return Err(AppError::Authorization("This is not your book".to_string()));
        }

        let category_id = match update.category.as_deref() {
            Some(name) => Some(self.repository.books.ensure_category(name).await?.id),
            None => None,
        };

        self.repository.books.update(book_id, &update, category_id).await?;
        self.repository.books.details(book_id).await
    }

    /// Delete a book. Only the owner may delete.
    pub async fn delete_book(&self, user_id: i32, book_id: i32) -> AppResult<()> {
        let book = self.repository.books.get_by_id(book_id).await?;
        if book.owner_id != user_id {
            return Err(AppError::Authorization("This is not your book".to_string()));
        }

        self.repository.books.delete(book_id).await?;
        tracing::info!("Book deleted: '{}' (id {})", book.title, book.id);
        Ok(())
    }

    /// Book details with owner, category, comments and availability
    pub async fn get_details(&self, book_id: i32) -> AppResult<BookDetails> {
        self.repository.books.details(book_id).await
    }

    /// All books, newest first
    pub async fn list_books(&self) -> AppResult<Vec<BookSummary>> {
        self.repository.books.list_all().await
    }

    /// Books owned by the caller
    pub async fn my_books(&self, owner_id: i32) -> AppResult<Vec<BookSummary>> {
        self.repository.books.list_by_owner(owner_id).await
    }

    /// Books most recently updated
    pub async fn recently_updated(&self) -> AppResult<Vec<BookSummary>> {
        self.repository.books.list_recently_updated().await
    }

    /// Case-insensitive substring search over title, author and category.
    /// An empty query is a validation error; an empty result set is a 404.
    pub async fn search(&self, query: &str) -> AppResult<Vec<BookSummary>> {
        if query.trim().is_empty() {
            return Err(AppError::Validation(
                "Please provide a search query".to_string(),
            ));
        }

        let books = self.repository.books.search(query.trim()).await?;
        if books.is_empty() {
            return Err(AppError::NotFound("No books found".to_string()));
        }
        Ok(books)
    }

    /// Books rated above 4, best first
    pub async fn top_rated(&self) -> AppResult<Vec<BookSummary>> {
        self.repository.books.top_rated().await
    }

    /// All categories
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.books.list_categories().await
    }

    /// Books belonging to one category
    pub async fn books_by_category(&self, category_id: i32) -> AppResult<Vec<BookSummary>> {
        // 404 on unknown category rather than an empty list
        self.repository.books.get_category(category_id).await?;
        self.repository.books.list_by_category(category_id).await
    }

    /// Toggle the caller's "liked" review of a book; returns the new rating
    pub async fn toggle_review(&self, user_id: i32, book_id: i32) -> AppResult<(i32, bool)> {
        self.repository.books.toggle_review(book_id, user_id).await
    }

    /// Get the raw book row (internal helpers and other services)
    pub async fn get_book(&self, book_id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(book_id).await
    }
}
