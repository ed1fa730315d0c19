//! Business logic services

pub mod borrows;
pub mod catalog;
pub mod comments;
pub mod email;
pub mod otp;
pub mod stats;
pub mod users;
pub mod wishlists;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, BorrowsConfig, EmailConfig, OtpConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub otp: otp::OtpService,
    pub catalog: catalog::CatalogService,
    pub borrows: borrows::BorrowsService,
    pub comments: comments::CommentsService,
    pub wishlists: wishlists::WishlistsService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        email_config: EmailConfig,
        borrows_config: BorrowsConfig,
        otp_config: OtpConfig,
    ) -> Self {
        let notifier: Arc<dyn email::Notifier> =
            Arc::new(email::EmailService::new(email_config));

        Self {
            users: users::UsersService::new(
                repository.clone(),
                auth_config,
                notifier.clone(),
            ),
            otp: otp::OtpService::new(repository.clone(), otp_config, notifier.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(
                repository.clone(),
                borrows_config,
                notifier,
            ),
            comments: comments::CommentsService::new(repository.clone()),
            wishlists: wishlists::WishlistsService::new(repository.clone()),
            stats: stats::StatsService::new(repository),
        }
    }
}
