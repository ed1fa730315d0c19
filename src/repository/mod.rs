//! Repository layer for database operations

pub mod books;
pub mod borrow_requests;
pub mod comments;
pub mod otps;
pub mod users;
pub mod wishlists;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub books: books::BooksRepository,
    pub borrow_requests: borrow_requests::BorrowRequestsRepository,
    pub comments: comments::CommentsRepository,
    pub wishlists: wishlists::WishlistsRepository,
    pub otps: otps::OtpsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            borrow_requests: borrow_requests::BorrowRequestsRepository::new(pool.clone()),
            comments: comments::CommentsRepository::new(pool.clone()),
            wishlists: wishlists::WishlistsRepository::new(pool.clone()),
            otps: otps::OtpsRepository::new(pool.clone()),
            pool,
        }
    }
}
