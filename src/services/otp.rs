//! One-time password service for the password reset flow.
//!
//! Codes are 6-digit numerics; only their SHA-256 digest is stored. The
//! plaintext leaves the process exactly once, inside the reset email.
//! Verification and reset share one lookup: the user's most recent unused
//! OTP, checked for expiry first and digest second.

use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::{
    config::OtpConfig,
    error::{AppError, AppResult},
    models::{otp::Otp, user::User},
    repository::Repository,
    services::email::{notify_detached, Notifier},
    services::users::hash_password,
};

/// Generate a random 6-digit code
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

/// SHA-256 hex digest of a code
pub fn hash_otp(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

#[derive(Clone)]
pub struct OtpService {
    repository: Repository,
    config: OtpConfig,
    notifier: Arc<dyn Notifier>,
}

impl OtpService {
    pub fn new(repository: Repository, config: OtpConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            config,
            notifier,
        }
    }

    /// Start a password reset: store a fresh hashed OTP and email the code.
    /// The plaintext is never returned to the caller.
    pub async fn request_reset(&self, email: &str) -> AppResult<()> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No account found for {}", email)))?;

        let code = generate_otp();
        let expired_at = Utc::now() + Duration::minutes(self.config.expiry_minutes);

        self.repository
            .otps
            .create(user.id, &hash_otp(&code), expired_at)
            .await?;

        notify_detached(
            self.notifier.clone(),
            user.email.clone(),
            "Your OTP Code".to_string(),
            format!(
                "Your OTP code is: {}. It will expire in {} minutes.",
                code, self.config.expiry_minutes
            ),
        );

        tracing::info!("Password reset OTP issued for {}", user.email);
        Ok(())
    }

    /// Find and validate the current OTP for an email address.
    /// Expiry is checked before the digest, so an expired code fails as
    /// expired no matter what was typed.
    async fn validate_current(&self, email: &str, code: &str) -> AppResult<(User, Otp)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User or OTP doesn't exist".to_string()))?;

        let otp = self
            .repository
            .otps
            .latest_unused(user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User or OTP doesn't exist".to_string()))?;

        if otp.is_expired(Utc::now()) {
            return Err(AppError::OtpExpired);
        }
        if otp.otp_hash != hash_otp(code) {
            return Err(AppError::OtpInvalid);
        }

        Ok((user, otp))
    }

    /// Check a code without consuming it
    pub async fn verify(&self, email: &str, code: &str) -> AppResult<()> {
        self.validate_current(email, code).await.map(|_| ())
    }

    /// Re-validate the code, then swap the password and consume the OTP
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let (user, otp) = self.validate_current(email, code).await?;

        let password_hash = hash_password(new_password)?;
        self.repository
            .otps
            .consume_and_reset_password(otp.id, user.id, &password_hash)
            .await?;

        tracing::info!("Password reset completed for {}", user.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn digest_is_deterministic_hex() {
        let a = hash_otp("123456");
        let b = hash_otp("123456");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_otp("123457"));
    }

    #[test]
    fn digest_does_not_leak_the_code() {
        assert!(!hash_otp("987654").contains("987654"));
    }
}
