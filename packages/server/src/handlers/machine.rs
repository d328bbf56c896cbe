use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::instrument;

use crate::entity::{machine, test};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::machine::{
    CreateMachineRequest, MachineResponse, UpdateMachineRequest, validate_machine_fields,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Machines",
    operation_id = "listMachines",
    summary = "List laser machines",
    description = "Returns all machines, ordered by brand then name.",
    responses(
        (status = 200, description = "List of machines", body = Vec<MachineResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_machines(
    State(state): State<AppState>,
) -> Result<Json<Vec<MachineResponse>>, AppError> {
    let rows = machine::Entity::find()
        .order_by_asc(machine::Column::Brand)
        .order_by_asc(machine::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(MachineResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Machines",
    operation_id = "getMachine",
    summary = "Get a machine by ID",
    params(("id" = i32, Path, description = "Machine ID")),
    responses(
        (status = 200, description = "Machine details", body = MachineResponse),
        (status = 404, description = "Machine not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_machine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MachineResponse>, AppError> {
    let model = find_machine(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Machines",
    operation_id = "createMachine",
    summary = "Register a laser machine",
    request_body = CreateMachineRequest,
    responses(
        (status = 201, description = "Machine created", body = MachineResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_machine(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateMachineRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_machine_fields(&payload.name, &payload.brand, &payload.laser_type)?;

    let new_machine = machine::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        brand: Set(payload.brand.trim().to_string()),
        model: Set(payload.model),
        laser_type: Set(payload.laser_type),
        is_mopa: Set(payload.is_mopa),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let model = new_machine.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(MachineResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Machines",
    operation_id = "updateMachine",
    summary = "Update a machine",
    params(("id" = i32, Path, description = "Machine ID")),
    request_body = UpdateMachineRequest,
    responses(
        (status = 200, description = "Machine updated", body = MachineResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Machine not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_machine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateMachineRequest>,
) -> Result<Json<MachineResponse>, AppError> {
    validate_machine_fields(&payload.name, &payload.brand, &payload.laser_type)?;

    let existing = find_machine(&state.db, id).await?;
    let mut active: machine::ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.brand = Set(payload.brand.trim().to_string());
    active.model = Set(payload.model);
    active.laser_type = Set(payload.laser_type);
    active.is_mopa = Set(payload.is_mopa);
    let model = active.update(&state.db).await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Machines",
    operation_id = "deleteMachine",
    summary = "Delete a machine",
    description = "Returns 409 CONFLICT if any test still references the machine.",
    params(("id" = i32, Path, description = "Machine ID")),
    responses(
        (status = 204, description = "Machine deleted"),
        (status = 404, description = "Machine not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Machine still referenced by tests (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_machine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    find_machine(&state.db, id).await?;

    let in_use = test::Entity::find()
        .filter(test::Column::MachineId.eq(id))
        .count(&state.db)
        .await?;
    if in_use > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a machine that is referenced by tests".into(),
        ));
    }

    machine::Entity::delete_by_id(id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_machine<C: ConnectionTrait>(db: &C, id: i32) -> Result<machine::Model, AppError> {
    machine::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Machine not found".into()))
}
