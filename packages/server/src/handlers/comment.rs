use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::instrument;

use crate::entity::{comment, test, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::comment::{CommentResponse, CreateCommentRequest, validate_create_comment};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Comments",
    operation_id = "listComments",
    summary = "List comments on a test",
    description = "Returns all comments for a test with the author's username, oldest first.",
    params(("id" = i32, Path, description = "Test ID")),
    responses(
        (status = 200, description = "List of comments", body = Vec<CommentResponse>),
        (status = 404, description = "Test not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(test_id))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(test_id): Path<i32>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    find_test(&state.db, test_id).await?;

    let rows = comment::Entity::find()
        .filter(comment::Column::TestId.eq(test_id))
        .order_by_asc(comment::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let usernames: HashMap<i32, String> = user::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let comments = rows
        .into_iter()
        .map(|c| CommentResponse {
            id: c.id,
            test_id: c.test_id,
            user_id: c.user_id,
            author: usernames.get(&c.user_id).cloned(),
            content: c.content,
            created_at: c.created_at,
        })
        .collect();

    Ok(Json(comments))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Comments",
    operation_id = "createComment",
    summary = "Comment on a test",
    params(("id" = i32, Path, description = "Test ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Test not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(test_id))]
pub async fn create_comment(
    State(state): State<AppState>,
    Path(test_id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_comment(&payload)?;
    find_test(&state.db, test_id).await?;

    let author = user::Entity::find_by_id(payload.user_id)
        .one(&state.db)
        .await?;

    let new_comment = comment::ActiveModel {
        test_id: Set(test_id),
        user_id: Set(payload.user_id),
        content: Set(payload.content.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let model = new_comment.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            id: model.id,
            test_id: model.test_id,
            user_id: model.user_id,
            author: author.map(|u| u.username),
            content: model.content,
            created_at: model.created_at,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{comment_id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    params(
        ("id" = i32, Path, description = "Test ID"),
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(test_id, comment_id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((test_id, comment_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let model = comment::Entity::find_by_id(comment_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;

    if model.test_id != test_id {
        return Err(AppError::NotFound("Comment not found".into()));
    }

    comment::Entity::delete_by_id(comment_id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_test<C: ConnectionTrait>(db: &C, id: i32) -> Result<test::Model, AppError> {
    test::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".into()))
}
