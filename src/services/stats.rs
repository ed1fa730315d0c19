//! Count queries for dashboards

use crate::{error::AppResult, repository::Repository};

/// Active-user counts for the admin dashboard
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_lenders: i64,
    pub total_borrowers: i64,
}

/// Per-user shelf counts
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct UserStats {
    pub total_books: i64,
    pub borrowed_books: i64,
    pub lent_books: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Platform-wide counts over active accounts
    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let (total_users, total_lenders, total_borrowers) =
            self.repository.users.dashboard_counts().await?;

        Ok(DashboardStats {
            total_users,
            total_lenders,
            total_borrowers,
        })
    }

    /// Counts for one user: owned, currently borrowed, currently lent
    pub async fn for_user(&self, user_id: i32) -> AppResult<UserStats> {
        let total_books = self.repository.books.count_by_owner(user_id).await?;
        let borrowed_books = self.repository.borrow_requests.count_borrowed(user_id).await?;
        let lent_books = self.repository.borrow_requests.count_lent(user_id).await?;

        Ok(UserStats {
            total_books,
            borrowed_books,
            lent_books,
        })
    }
}
