use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    /// Author of the comment.
    #[schema(example = 3)]
    pub user_id: i32,
    #[schema(example = "Great contrast at 60% power.")]
    pub content: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub test_id: i32,
    pub user_id: i32,
    /// Username of the author, if the account still exists.
    pub author: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub fn validate_create_comment(req: &CreateCommentRequest) -> Result<(), AppError> {
    if req.user_id <= 0 {
        return Err(AppError::Validation(
            "user_id is required and must be positive".into(),
        ));
    }
    let content = req.content.trim();
    if content.is_empty() || content.chars().count() > 2000 {
        return Err(AppError::Validation(
            "Content must be 1-2000 characters".into(),
        ));
    }
    Ok(())
}
