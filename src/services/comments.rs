//! Comment and vote service

use crate::{
    error::{AppError, AppResult},
    models::comment::{
        Comment, CreateComment, UpdateComment, VoteAction, VoteKind, VoteTally,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CommentsService {
    repository: Repository,
}

impl CommentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a comment (or threaded reply) to a book
    pub async fn add(
        &self,
        user_id: i32,
        book_id: i32,
        comment: CreateComment,
    ) -> AppResult<Comment> {
        // 404 on unknown book before touching comments
        self.repository.books.get_by_id(book_id).await?;

        self.repository
            .comments
            .create(user_id, book_id, &comment.content, comment.parent_id)
            .await
    }

    /// Edit a comment. Only the author may edit.
    pub async fn edit(
        &self,
        user_id: i32,
        comment_id: i32,
        update: UpdateComment,
    ) -> AppResult<Comment> {
        let comment = self.repository.comments.get_by_id(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::Authorization(
                "You can't edit the comment".to_string(),
            ));
        }

        self.repository.comments.update(comment_id, &update.content).await
    }

    /// Delete a comment. Only the author may delete.
    pub async fn delete(&self, user_id: i32, comment_id: i32) -> AppResult<()> {
        let comment = self.repository.comments.get_by_id(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::Authorization(
                "You can't delete the comment".to_string(),
            ));
        }

        self.repository.comments.delete(comment_id).await
    }

    /// Vote on a comment; returns the action taken and the new tallies
    pub async fn vote(
        &self,
        user_id: i32,
        comment_id: i32,
        vote: VoteKind,
    ) -> AppResult<(VoteAction, VoteTally)> {
        self.repository.comments.vote(user_id, comment_id, vote).await
    }
}
