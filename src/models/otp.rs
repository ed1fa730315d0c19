//! One-time password model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored OTP record. Only the SHA-256 digest of the code is kept.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Otp {
    pub id: i32,
    pub user_id: i32,
    pub otp_hash: String,
    pub is_used: bool,
    pub expired_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Otp {
    /// Whether the code has passed its expiry window at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expired_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn otp(expired_at: DateTime<Utc>) -> Otp {
        Otp {
            id: 1,
            user_id: 1,
            otp_hash: "ab".repeat(32),
            is_used: false,
            expired_at,
            created_at: expired_at - Duration::minutes(10),
        }
    }

    #[test]
    fn expiry_is_strict() {
        let due = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let record = otp(due);
        assert!(!record.is_expired(due));
        assert!(record.is_expired(due + Duration::seconds(1)));
        assert!(!record.is_expired(due - Duration::minutes(5)));
    }
}
