//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, UpdateProfile, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (primary authentication method)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new user. Accounts start inactive until an admin approves them.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        location: Option<&str>,
        password_hash: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, location, role, is_active)
            VALUES ($1, $2, $3, $4, 'USER', FALSE)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(location)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update name/location of an existing user
    pub async fn update_profile(&self, id: i32, profile: &UpdateProfile) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                location = COALESCE($3, location),
                updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(profile.name.as_deref())
        .bind(profile.location.as_deref())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        Ok(user)
    }

    /// Replace the stored password hash
    pub async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// Activate or deactivate an account
    pub async fn set_active(&self, id: i32, active: bool) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Promote a user to admin: role ADMIN, staff and active flags set
    pub async fn promote_to_admin(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $2, is_staff = TRUE, is_active = TRUE, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Role::Admin)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// List every user, newest first
    pub async fn list_all(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// List users filtered by activation state, newest first
    pub async fn list_by_active(&self, active: bool) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE is_active = $1 ORDER BY created_at DESC",
        )
        .bind(active)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Create the initial superuser account unless the email is taken.
    /// Returns None when an account with that email already exists.
    pub async fn ensure_superuser(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<Option<User>> {
        if self.email_exists(email).await? {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role, is_active, is_staff, is_superuser)
            VALUES ($1, $2, $3, 'ADMIN', TRUE, TRUE, TRUE)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(user))
    }

    /// Active-user counts for the admin dashboard: (users, lenders, borrowers)
    pub async fn dashboard_counts(&self) -> AppResult<(i64, i64, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active")
            .fetch_one(&self.pool)
            .await?;
        let lenders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active AND is_lender")
                .fetch_one(&self.pool)
                .await?;
        let borrowers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active AND is_borrower")
                .fetch_one(&self.pool)
                .await?;
        Ok((total, lenders, borrowers))
    }
}
