//! Comment, reply and vote models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

/// Vote direction on a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Upvote,
    Downvote,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Upvote => "upvote",
            VoteKind::Downvote => "downvote",
        }
    }
}

impl std::fmt::Display for VoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VoteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upvote" => Ok(VoteKind::Upvote),
            "downvote" => Ok(VoteKind::Downvote),
            _ => Err(format!("Invalid vote: {}", s)),
        }
    }
}

// SQLx conversion for VoteKind (stored as varchar)
impl sqlx::Type<Postgres> for VoteKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for VoteKind {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for VoteKind {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// What a vote submission did to the existing vote row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Created,
    Switched,
    Removed,
}

/// Outcome of applying a vote: the row action plus counter adjustments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub action: VoteAction,
    pub upvote_delta: i32,
    pub downvote_delta: i32,
}

/// Tally adjustment for a vote submission against the voter's current vote.
///
/// Re-submitting the same direction removes the vote, the opposite direction
/// moves one count across, and a first vote adds one count.
pub fn vote_deltas(existing: Option<VoteKind>, incoming: VoteKind) -> VoteOutcome {
    match existing {
        Some(current) if current == incoming => VoteOutcome {
            action: VoteAction::Removed,
            upvote_delta: if incoming == VoteKind::Upvote { -1 } else { 0 },
            downvote_delta: if incoming == VoteKind::Downvote { -1 } else { 0 },
        },
        Some(_) => VoteOutcome {
            action: VoteAction::Switched,
            upvote_delta: if incoming == VoteKind::Upvote { 1 } else { -1 },
            downvote_delta: if incoming == VoteKind::Downvote { 1 } else { -1 },
        },
        None => VoteOutcome {
            action: VoteAction::Created,
            upvote_delta: if incoming == VoteKind::Upvote { 1 } else { 0 },
            downvote_delta: if incoming == VoteKind::Downvote { 1 } else { 0 },
        },
    }
}

/// Comment model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Comment {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub parent_id: Option<i32>,
    pub content: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Comment with author name and nested replies, for book detail views
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentNode {
    pub id: i32,
    pub user: String,
    pub content: String,
    pub parent_id: Option<i32>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<CommentNode>,
}

/// Flat comment row (with author name) before thread assembly
#[derive(Debug, Clone)]
pub struct FlatComment {
    pub id: i32,
    pub user: String,
    pub content: String,
    pub parent_id: Option<i32>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
}

/// Assemble flat rows (ordered by creation time) into a reply tree.
/// Rows whose parent is missing from the input are treated as roots.
pub fn assemble_tree(rows: Vec<FlatComment>) -> Vec<CommentNode> {
    use std::collections::{HashMap, HashSet};

    let known: HashSet<i32> = rows.iter().map(|c| c.id).collect();
    let mut by_parent: HashMap<Option<i32>, Vec<FlatComment>> = HashMap::new();
    for row in rows {
        let parent = row.parent_id.filter(|p| known.contains(p));
        by_parent.entry(parent).or_default().push(row);
    }

    fn attach(
        parent: Option<i32>,
        by_parent: &mut std::collections::HashMap<Option<i32>, Vec<FlatComment>>,
    ) -> Vec<CommentNode> {
        let children = by_parent.remove(&parent).unwrap_or_default();
        children
            .into_iter()
            .map(|c| {
                let replies = attach(Some(c.id), by_parent);
                CommentNode {
                    id: c.id,
                    user: c.user,
                    content: c.content,
                    parent_id: c.parent_id,
                    upvotes: c.upvotes,
                    downvotes: c.downvotes,
                    created_at: c.created_at,
                    replies,
                }
            })
            .collect()
    }

    attach(None, &mut by_parent)
}

/// Create comment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,
    /// Parent comment for threaded replies
    pub parent_id: Option<i32>,
}

/// Edit comment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateComment {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,
}

/// Vote submission
#[derive(Debug, Deserialize, ToSchema)]
pub struct VoteRequest {
    pub vote: VoteKind,
}

/// Current tallies returned after a vote
#[derive(Debug, Serialize, ToSchema)]
pub struct VoteTally {
    pub upvotes: i32,
    pub downvotes: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_vote_creates_and_increments() {
        let outcome = vote_deltas(None, VoteKind::Upvote);
        assert_eq!(outcome.action, VoteAction::Created);
        assert_eq!((outcome.upvote_delta, outcome.downvote_delta), (1, 0));
    }

    #[test]
    fn repeated_vote_removes_itself() {
        let outcome = vote_deltas(Some(VoteKind::Downvote), VoteKind::Downvote);
        assert_eq!(outcome.action, VoteAction::Removed);
        assert_eq!((outcome.upvote_delta, outcome.downvote_delta), (0, -1));
    }

    #[test]
    fn opposite_vote_moves_one_count_across() {
        let outcome = vote_deltas(Some(VoteKind::Downvote), VoteKind::Upvote);
        assert_eq!(outcome.action, VoteAction::Switched);
        assert_eq!((outcome.upvote_delta, outcome.downvote_delta), (1, -1));
    }

    fn flat(id: i32, parent_id: Option<i32>) -> FlatComment {
        FlatComment {
            id,
            user: format!("user-{id}"),
            content: "text".to_string(),
            parent_id,
            upvotes: 0,
            downvotes: 0,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn tree_nests_replies_under_parents() {
        let tree = assemble_tree(vec![flat(1, None), flat(2, Some(1)), flat(3, Some(2)), flat(4, None)]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, 1);
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].id, 2);
        assert_eq!(tree[0].replies[0].replies[0].id, 3);
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn orphaned_reply_becomes_root() {
        let tree = assemble_tree(vec![flat(5, Some(99))]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 5);
    }

    #[test]
    fn toggle_round_trip_is_neutral() {
        // create then remove leaves both tallies unchanged
        let created = vote_deltas(None, VoteKind::Upvote);
        let removed = vote_deltas(Some(VoteKind::Upvote), VoteKind::Upvote);
        assert_eq!(created.upvote_delta + removed.upvote_delta, 0);
        assert_eq!(created.downvote_delta + removed.downvote_delta, 0);
    }
}
