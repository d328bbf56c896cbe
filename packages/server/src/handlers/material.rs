use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::instrument;

use crate::entity::{material, test};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::material::{
    CreateMaterialRequest, MaterialListQuery, MaterialResponse, validate_create_material,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Materials",
    operation_id = "listMaterials",
    summary = "List materials",
    description = "Returns all materials ordered by name. With `machine_id`, returns only \
        materials that already have a published test on that machine.",
    params(MaterialListQuery),
    responses(
        (status = 200, description = "List of materials", body = Vec<MaterialResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialListQuery>,
) -> Result<Json<Vec<MaterialResponse>>, AppError> {
    let mut select = material::Entity::find().order_by_asc(material::Column::Name);

    if let Some(machine_id) = query.machine_id {
        let tested: HashSet<i32> = test::Entity::find()
            .filter(test::Column::MachineId.eq(machine_id))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|t| t.material_id)
            .collect();
        let ids: Vec<i32> = tested.into_iter().collect();
        select = select.filter(material::Column::Id.is_in(ids));
    }

    let rows = select.all(&state.db).await?;
    Ok(Json(rows.into_iter().map(MaterialResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Materials",
    operation_id = "getMaterial",
    summary = "Get a material by ID",
    params(("id" = i32, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material details", body = MaterialResponse),
        (status = 404, description = "Material not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MaterialResponse>, AppError> {
    let model = find_material(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Materials",
    operation_id = "createMaterial",
    summary = "Register a material",
    request_body = CreateMaterialRequest,
    responses(
        (status = 201, description = "Material created", body = MaterialResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_material(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateMaterialRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_material(&payload)?;

    let new_material = material::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        category: Set(payload.category),
        thickness: Set(payload.thickness),
        color: Set(payload.color),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let model = new_material.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(MaterialResponse::from(model))))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Materials",
    operation_id = "deleteMaterial",
    summary = "Delete a material",
    description = "Returns 409 CONFLICT if any test still references the material.",
    params(("id" = i32, Path, description = "Material ID")),
    responses(
        (status = 204, description = "Material deleted"),
        (status = 404, description = "Material not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Material still referenced by tests (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    find_material(&state.db, id).await?;

    let in_use = test::Entity::find()
        .filter(test::Column::MaterialId.eq(id))
        .count(&state.db)
        .await?;
    if in_use > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a material that is referenced by tests".into(),
        ));
    }

    material::Entity::delete_by_id(id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_material<C: ConnectionTrait>(db: &C, id: i32) -> Result<material::Model, AppError> {
    material::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Material not found".into()))
}
