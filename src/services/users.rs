//! Authentication and account management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{ChangePassword, Claims, SignUp, UpdateProfile, User},
    repository::Repository,
    services::email::{notify_detached, Notifier},
};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    notifier: Arc<dyn Notifier>,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            config,
            notifier,
        }
    }

    /// Register a new user. The account starts inactive and waits for admin
    /// approval; a confirmation mail goes out best-effort.
    pub async fn sign_up(&self, signup: SignUp) -> AppResult<User> {
        if self.repository.users.email_exists(&signup.email).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = hash_password(&signup.password)?;
        let user = self
            .repository
            .users
            .create(
                &signup.name,
                &signup.email,
                signup.location.as_deref(),
                &password_hash,
            )
            .await?;

        notify_detached(
            self.notifier.clone(),
            user.email.clone(),
            "Welcome to Floating Library".to_string(),
            "Thank you for registering with Floating Library. Your account is under review and will be activated soon.".to_string(),
        );

        tracing::info!("New user registered: {} ({})", user.name, user.email);
        Ok(user)
    }

    /// Authenticate by email and password, returning a JWT and the user.
    ///
    /// Unknown email and wrong password produce the same 401; inactive
    /// accounts get an explicit 403.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !user.is_active {
            return Err(AppError::Authorization(
                "Your account is not active. Please wait for admin approval".to_string(),
            ));
        }

        if !verify_password(&user.password, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Create a JWT token for a user
    fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = Claims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Update the caller's own profile
    pub async fn update_profile(&self, user_id: i32, profile: UpdateProfile) -> AppResult<User> {
        self.repository.users.update_profile(user_id, &profile).await
    }

    /// Change the caller's password after re-proving the old one
    pub async fn change_password(&self, user_id: i32, change: ChangePassword) -> AppResult<()> {
        let user = self.repository.users.get_by_id(user_id).await?;

        if !verify_password(&user.password, &change.old_password)? {
            return Err(AppError::Validation("Old password is incorrect".to_string()));
        }

        let password_hash = hash_password(&change.new_password)?;
        self.repository.users.update_password(user_id, &password_hash).await
    }

    /// Activate an account and notify its owner
    pub async fn activate(&self, user_id: i32) -> AppResult<User> {
        let user = self.repository.users.set_active(user_id, true).await?;

        notify_detached(
            self.notifier.clone(),
            user.email.clone(),
            "Account Activation Notice".to_string(),
            "Your account has been activated. You can now log in and start using our services."
                .to_string(),
        );

        tracing::info!("Account activated: {}", user.email);
        Ok(user)
    }

    /// Deactivate an account and notify its owner
    pub async fn deactivate(&self, user_id: i32) -> AppResult<User> {
        let user = self.repository.users.set_active(user_id, false).await?;

        notify_detached(
            self.notifier.clone(),
            user.email.clone(),
            "Account Deactivation Notice".to_string(),
            "Your account has been deactivated. Please contact support for more information."
                .to_string(),
        );

        tracing::info!("Account deactivated: {}", user.email);
        Ok(user)
    }

    /// Promote a user to admin
    pub async fn promote_to_admin(&self, user_id: i32) -> AppResult<User> {
        let user = self.repository.users.promote_to_admin(user_id).await?;
        tracing::info!("User promoted to admin: {}", user.email);
        Ok(user)
    }

    /// List every user
    pub async fn list_all(&self) -> AppResult<Vec<User>> {
        self.repository.users.list_all().await
    }

    /// List users by activation state
    pub async fn list_by_active(&self, active: bool) -> AppResult<Vec<User>> {
        self.repository.users.list_by_active(active).await
    }
}
