//! Comment service

use anyhow::Result;
use std::sync::Arc;

use crate::db::repositories::CommentRepository;
use crate::forms::{CommentForm, FormErrors, RawCommentForm};
use crate::models::{Comment, CreateCommentInput};

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    /// Validate and persist one comment submission.
    ///
    /// Returns the saved comment, or the field errors with nothing
    /// written. The outer Result carries database failures.
    pub async fn submit(
        &self,
        post_id: i64,
        raw: &RawCommentForm,
    ) -> Result<Result<Comment, FormErrors>> {
        let form = match CommentForm::validate(raw) {
            Ok(form) => form,
            Err(errors) => return Ok(Err(errors)),
        };

        let comment = self
            .repo
            .create(&CreateCommentInput {
                post_id,
                name: form.name,
                email: form.email,
                body: form.body,
            })
            .await?;

        tracing::info!(post_id, comment_id = comment.id, "comment saved");
        Ok(Ok(comment))
    }
}
