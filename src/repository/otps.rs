//! OTP repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::otp::Otp};

#[derive(Clone)]
pub struct OtpsRepository {
    pool: Pool<Postgres>,
}

impl OtpsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store a new OTP digest for a user
    pub async fn create(
        &self,
        user_id: i32,
        otp_hash: &str,
        expired_at: DateTime<Utc>,
    ) -> AppResult<Otp> {
        let otp = sqlx::query_as::<_, Otp>(
            r#"
            INSERT INTO otps (user_id, otp_hash, is_used, expired_at)
            VALUES ($1, $2, FALSE, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(otp_hash)
        .bind(expired_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(otp)
    }

    /// The user's current OTP: most recent unused one, if any.
    ///
    /// Both verification and password reset go through this single lookup.
    pub async fn latest_unused(&self, user_id: i32) -> AppResult<Option<Otp>> {
        let otp = sqlx::query_as::<_, Otp>(
            r#"
            SELECT * FROM otps
            WHERE user_id = $1 AND is_used = FALSE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(otp)
    }

    /// Consume an OTP and swap the user's password hash in one transaction
    pub async fn consume_and_reset_password(
        &self,
        otp_id: i32,
        user_id: i32,
        password_hash: &str,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE otps SET is_used = TRUE WHERE id = $1")
            .bind(otp_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET password = $2, updated_at = $3 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
