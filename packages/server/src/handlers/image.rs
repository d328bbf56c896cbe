use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::utils::filename::validate_image_name;

#[utoipa::path(
    get,
    path = "/{name}",
    tag = "Images",
    operation_id = "getImage",
    summary = "Serve a stored test image",
    description = "Streams an uploaded image by its blob name. Names are flat; anything that \
        looks like a path is rejected before touching the filesystem.",
    params(("name" = String, Path, description = "Blob name, e.g. `0193a0c2-....png`")),
    responses(
        (status = 200, description = "Image content"),
        (status = 400, description = "Invalid image name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(name))]
pub async fn get_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let name = validate_image_name(&name)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();

    let size = state.blob_store.size(&name).await?;
    let reader = state.blob_store.open(&name).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = mime_guess::from_path(&name)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}
