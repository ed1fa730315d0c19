//! Borrow request service: orchestrates the lifecycle engine and owner
//! notifications.

use std::sync::Arc;

use crate::{
    config::BorrowsConfig,
    error::AppResult,
    models::borrow_request::BorrowRequestDetails,
    repository::Repository,
    services::email::{notify_detached, Notifier},
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    config: BorrowsConfig,
    notifier: Arc<dyn Notifier>,
}

impl BorrowsService {
    pub fn new(repository: Repository, config: BorrowsConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            config,
            notifier,
        }
    }

    /// Request to borrow a book. On success the owner is alerted by email,
    /// best-effort, after the request is committed.
    pub async fn create(&self, requester_id: i32, book_id: i32) -> AppResult<BorrowRequestDetails> {
        let request = self
            .repository
            .borrow_requests
            .create(requester_id, book_id, self.config.max_active_borrows)
            .await?;

        let details = self.repository.borrow_requests.details(request.id).await?;

        notify_detached(
            self.notifier.clone(),
            details.owner.email.clone(),
            "New Borrow Request".to_string(),
            format!(
                "You have a new borrow request for your book '{}' from {}.",
                details.book.title, details.requester.email
            ),
        );

        tracing::info!(
            "Borrow request {} created: user {} -> book {}",
            details.id,
            requester_id,
            book_id
        );
        Ok(details)
    }

    /// Cancel a pending request (requester only)
    pub async fn cancel(&self, requester_id: i32, request_id: i32) -> AppResult<BorrowRequestDetails> {
        self.repository.borrow_requests.cancel(requester_id, request_id).await?;
        self.repository.borrow_requests.details(request_id).await
    }

    /// Accept a pending request (owner only)
    pub async fn accept(&self, owner_id: i32, request_id: i32) -> AppResult<BorrowRequestDetails> {
        self.repository
            .borrow_requests
            .accept(owner_id, request_id, self.config.loan_period_days)
            .await?;
        self.repository.borrow_requests.details(request_id).await
    }

    /// Reject a pending request (owner only)
    pub async fn reject(&self, owner_id: i32, request_id: i32) -> AppResult<BorrowRequestDetails> {
        self.repository.borrow_requests.reject(owner_id, request_id).await?;
        self.repository.borrow_requests.details(request_id).await
    }

    /// Return an accepted book (requester only)
    pub async fn return_book(
        &self,
        requester_id: i32,
        request_id: i32,
    ) -> AppResult<BorrowRequestDetails> {
        let request = self
            .repository
            .borrow_requests
            .return_book(requester_id, request_id)
            .await?;

        if request.is_late {
            tracing::info!("Borrow request {} returned late", request.id);
        }
        self.repository.borrow_requests.details(request_id).await
    }

    /// Requests the user has sent, newest first
    pub async fn borrow_history(&self, user_id: i32) -> AppResult<Vec<BorrowRequestDetails>> {
        self.repository.borrow_requests.list_by_requester(user_id).await
    }

    /// Requests the user has received for their books, newest first
    pub async fn lend_history(&self, user_id: i32) -> AppResult<Vec<BorrowRequestDetails>> {
        self.repository.borrow_requests.list_by_owner(user_id).await
    }
}
