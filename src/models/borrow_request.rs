//! Borrow request model and state machine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use super::book::BookSummary;
use super::user::UserBrief;

/// Borrow request lifecycle.
///
/// PENDING -> ACCEPTED | REJECTED | CANCELLED, ACCEPTED -> RETURNED.
/// REJECTED, CANCELLED and RETURNED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BorrowStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Returned,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Pending => "PENDING",
            BorrowStatus::Accepted => "ACCEPTED",
            BorrowStatus::Rejected => "REJECTED",
            BorrowStatus::Cancelled => "CANCELLED",
            BorrowStatus::Returned => "RETURNED",
        }
    }

    /// A terminal status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BorrowStatus::Rejected | BorrowStatus::Cancelled | BorrowStatus::Returned
        )
    }

    /// Whether the requester may still cancel
    pub fn can_cancel(&self) -> bool {
        *self == BorrowStatus::Pending
    }

    /// Whether the owner may accept or reject
    pub fn can_decide(&self) -> bool {
        *self == BorrowStatus::Pending
    }

    /// Whether the requester may return the book
    pub fn can_return(&self) -> bool {
        *self == BorrowStatus::Accepted
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(BorrowStatus::Pending),
            "ACCEPTED" => Ok(BorrowStatus::Accepted),
            "REJECTED" => Ok(BorrowStatus::Rejected),
            "CANCELLED" => Ok(BorrowStatus::Cancelled),
            "RETURNED" => Ok(BorrowStatus::Returned),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

// SQLx conversion for BorrowStatus (stored as varchar)
impl sqlx::Type<Postgres> for BorrowStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BorrowStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Due date for a request accepted at `accepted_at`
pub fn return_date_for(accepted_at: DateTime<Utc>, loan_period_days: i64) -> DateTime<Utc> {
    accepted_at + Duration::days(loan_period_days)
}

/// Whether a return happening at `now` is late
pub fn is_late_at(now: DateTime<Utc>, return_date: Option<DateTime<Utc>>) -> bool {
    return_date.map(|due| now > due).unwrap_or(false)
}

/// Borrow request model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequest {
    pub id: i32,
    pub requester_id: i32,
    /// Book owner, denormalized from the book at creation time
    pub owner_id: i32,
    pub book_id: i32,
    pub status: BorrowStatus,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_late: bool,
}

/// Borrow request with embedded book and counterpart summaries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowRequestDetails {
    pub id: i32,
    pub status: BorrowStatus,
    pub book: BookSummary,
    pub requester: UserBrief,
    pub owner: UserBrief,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_late: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn terminal_states() {
        assert!(BorrowStatus::Rejected.is_terminal());
        assert!(BorrowStatus::Cancelled.is_terminal());
        assert!(BorrowStatus::Returned.is_terminal());
        assert!(!BorrowStatus::Pending.is_terminal());
        assert!(!BorrowStatus::Accepted.is_terminal());
    }

    #[test]
    fn only_pending_can_be_decided_or_cancelled() {
        for status in [
            BorrowStatus::Accepted,
            BorrowStatus::Rejected,
            BorrowStatus::Cancelled,
            BorrowStatus::Returned,
        ] {
            assert!(!status.can_decide(), "{status} should not be decidable");
            assert!(!status.can_cancel(), "{status} should not be cancellable");
        }
        assert!(BorrowStatus::Pending.can_decide());
        assert!(BorrowStatus::Pending.can_cancel());
    }

    #[test]
    fn only_accepted_can_be_returned() {
        assert!(BorrowStatus::Accepted.can_return());
        assert!(!BorrowStatus::Pending.can_return());
        assert!(!BorrowStatus::Returned.can_return());
    }

    #[test]
    fn return_date_is_accepted_plus_loan_period() {
        let accepted = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let due = return_date_for(accepted, 14);
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn late_only_strictly_after_due_date() {
        let due = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        assert!(!is_late_at(due, Some(due)));
        assert!(!is_late_at(due - Duration::hours(1), Some(due)));
        assert!(is_late_at(due + Duration::seconds(1), Some(due)));
        assert!(!is_late_at(due, None));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            BorrowStatus::Pending,
            BorrowStatus::Accepted,
            BorrowStatus::Rejected,
            BorrowStatus::Cancelled,
            BorrowStatus::Returned,
        ] {
            assert_eq!(status.as_str().parse::<BorrowStatus>().unwrap(), status);
        }
        assert!("LOST".parse::<BorrowStatus>().is_err());
    }
}
