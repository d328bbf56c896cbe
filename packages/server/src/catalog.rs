//! Composite write path for test records.
//!
//! A test is only valid together with its `parameters` row, and its image
//! blob lives outside the database. The functions here own that consistency:
//! both rows are written in one transaction, and blob side effects are
//! ordered so the database never references a file that was not durably
//! stored: validate, store the new blob, run the transaction, and only
//! after commit release any blob the record no longer references. When the
//! transaction fails, the freshly stored blob is removed again and the
//! previously referenced one is left untouched.

use common::storage::{BlobStore, sniff};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::warn;

use crate::config::StorageConfig;
use crate::entity::{comment, parameters, test};
use crate::error::AppError;
use crate::models::test::{
    NewTest, TestUpdate, TestWriteResponse, UploadedImage, validate_new_test, validate_test_update,
};

/// Defaults applied to omitted optional settings on create.
pub const DEFAULT_Z_OFFSET: f64 = 0.0;
pub const DEFAULT_NB_PASSES: i32 = 1;
pub const DEFAULT_SWEEP: i32 = 1;
pub const DEFAULT_HATCH: f64 = 0.0;
pub const DEFAULT_ROW_INTERVAL: f64 = 0.05;
pub const DEFAULT_WOBBLE: f64 = 0.0;

/// Create a test together with its parameters row and optional image.
pub async fn create_test(
    db: &DatabaseConnection,
    store: &dyn BlobStore,
    cfg: &StorageConfig,
    input: NewTest,
    file: Option<UploadedImage>,
) -> Result<TestWriteResponse, AppError> {
    validate_new_test(&input)?;
    if let Some(file) = &file {
        validate_image(file, cfg)?;
    }

    // The blob write precedes the transaction; the failure arms below are
    // responsible for removing it again.
    let stored_image = match &file {
        Some(file) => Some(store.store(&file.data, &file.filename).await?),
        None => None,
    };
    let image = stored_image
        .clone()
        .unwrap_or_else(|| cfg.default_image.clone());

    let txn = db.begin().await?;
    match insert_rows(&txn, &input, &image).await {
        Ok(test_id) => match txn.commit().await {
            Ok(()) => Ok(TestWriteResponse { test_id, image }),
            Err(err) => {
                discard_blob(store, stored_image.as_deref()).await;
                Err(err.into())
            }
        },
        Err(err) => {
            rollback(txn).await;
            discard_blob(store, stored_image.as_deref()).await;
            Err(err)
        }
    }
}

/// Update a test and its parameters row, optionally replacing the image.
///
/// Omitted optional settings retain their stored values. The previous image
/// is deleted only after a successful commit, so a failed update never
/// destroys the still-referenced file.
pub async fn update_test(
    db: &DatabaseConnection,
    store: &dyn BlobStore,
    cfg: &StorageConfig,
    test_id: i32,
    input: TestUpdate,
    file: Option<UploadedImage>,
) -> Result<TestWriteResponse, AppError> {
    validate_test_update(&input)?;
    if let Some(file) = &file {
        validate_image(file, cfg)?;
    }

    let existing = find_test(db, test_id).await?;
    let previous_image = existing.image.clone();

    let stored_image = match &file {
        Some(file) => Some(store.store(&file.data, &file.filename).await?),
        None => None,
    };
    let image = stored_image
        .clone()
        .unwrap_or_else(|| previous_image.clone());

    let txn = db.begin().await?;
    match update_rows(&txn, existing, &input, &image).await {
        Ok(()) => match txn.commit().await {
            Ok(()) => {
                if stored_image.is_some()
                    && previous_image != cfg.default_image
                    && previous_image != image
                {
                    release_blob(store, &previous_image).await;
                }
                Ok(TestWriteResponse { test_id, image })
            }
            Err(err) => {
                discard_blob(store, stored_image.as_deref()).await;
                Err(err.into())
            }
        },
        Err(err) => {
            rollback(txn).await;
            discard_blob(store, stored_image.as_deref()).await;
            Err(err)
        }
    }
}

/// Delete a test, its parameters row, and its non-default image.
pub async fn delete_test(
    db: &DatabaseConnection,
    store: &dyn BlobStore,
    cfg: &StorageConfig,
    test_id: i32,
) -> Result<(), AppError> {
    let existing = find_test(db, test_id).await?;

    let txn = db.begin().await?;
    match delete_rows(&txn, test_id).await {
        Ok(()) => txn.commit().await?,
        Err(err) => {
            rollback(txn).await;
            return Err(err);
        }
    }

    if existing.image != cfg.default_image {
        release_blob(store, &existing.image).await;
    }
    Ok(())
}

async fn find_test(db: &DatabaseConnection, id: i32) -> Result<test::Model, AppError> {
    test::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".into()))
}

async fn insert_rows(
    txn: &DatabaseTransaction,
    input: &NewTest,
    image: &str,
) -> Result<i32, AppError> {
    let new_test = test::ActiveModel {
        title: Set(input.title.trim().to_string()),
        description: Set(input.description.clone()),
        image: Set(image.to_string()),
        machine_id: Set(input.machine_id),
        material_id: Set(input.material_id),
        user_id: Set(input.user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let test_row = new_test.insert(txn).await?;

    let s = &input.settings;
    let new_params = parameters::ActiveModel {
        test_id: Set(test_row.id),
        speed: Set(s.speed),
        power: Set(s.power),
        frequency: Set(s.frequency),
        pulse: Set(s.pulse),
        z_offset: Set(s.z_offset.unwrap_or(DEFAULT_Z_OFFSET)),
        nb_passes: Set(s.nb_passes.unwrap_or(DEFAULT_NB_PASSES)),
        sweep: Set(s.sweep.unwrap_or(DEFAULT_SWEEP)),
        hatch: Set(s.hatch.unwrap_or(DEFAULT_HATCH)),
        row_interval: Set(s.row_interval.unwrap_or(DEFAULT_ROW_INTERVAL)),
        wobble: Set(s.wobble.unwrap_or(DEFAULT_WOBBLE)),
    };
    new_params.insert(txn).await?;

    Ok(test_row.id)
}

async fn update_rows(
    txn: &DatabaseTransaction,
    existing: test::Model,
    input: &TestUpdate,
    image: &str,
) -> Result<(), AppError> {
    let test_id = existing.id;

    let mut active: test::ActiveModel = existing.into();
    active.title = Set(input.title.trim().to_string());
    active.description = Set(input.description.clone());
    active.image = Set(image.to_string());
    active.machine_id = Set(input.machine_id);
    active.material_id = Set(input.material_id);
    active.update(txn).await?;

    let current = parameters::Entity::find_by_id(test_id)
        .one(txn)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("parameters row missing for test {test_id}"))
        })?;

    let s = &input.settings;
    let mut active: parameters::ActiveModel = current.clone().into();
    active.speed = Set(s.speed);
    active.power = Set(s.power);
    active.frequency = Set(s.frequency);
    // Omitted optional settings keep their stored values.
    active.pulse = Set(s.pulse.or(current.pulse));
    active.z_offset = Set(s.z_offset.unwrap_or(current.z_offset));
    active.nb_passes = Set(s.nb_passes.unwrap_or(current.nb_passes));
    active.sweep = Set(s.sweep.unwrap_or(current.sweep));
    active.hatch = Set(s.hatch.unwrap_or(current.hatch));
    active.row_interval = Set(s.row_interval.unwrap_or(current.row_interval));
    active.wobble = Set(s.wobble.unwrap_or(current.wobble));
    active.update(txn).await?;

    Ok(())
}

async fn delete_rows(txn: &DatabaseTransaction, test_id: i32) -> Result<(), AppError> {
    comment::Entity::delete_many()
        .filter(comment::Column::TestId.eq(test_id))
        .exec(txn)
        .await?;
    parameters::Entity::delete_by_id(test_id).exec(txn).await?;
    test::Entity::delete_by_id(test_id).exec(txn).await?;
    Ok(())
}

/// Check an upload before any store or database write.
fn validate_image(file: &UploadedImage, cfg: &StorageConfig) -> Result<(), AppError> {
    if file.data.len() as u64 > cfg.max_upload_size {
        return Err(AppError::Validation(format!(
            "Image must not exceed {} bytes",
            cfg.max_upload_size
        )));
    }
    let kind = sniff::sniff_image(&file.data).ok_or_else(|| {
        AppError::Validation("Image format not allowed (JPEG, PNG, WEBP only)".into())
    })?;
    if !cfg.allowed_types.iter().any(|t| t == kind.mime()) {
        return Err(AppError::Validation(format!(
            "Image type {} is not allowed",
            kind.mime()
        )));
    }
    Ok(())
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(err) = txn.rollback().await {
        warn!("rollback failed: {err}");
    }
}

/// Remove a blob that was stored earlier in a request whose transaction
/// failed. Cleanup failure is swallowed: the transaction error dominates.
async fn discard_blob(store: &dyn BlobStore, name: Option<&str>) {
    let Some(name) = name else { return };
    if let Err(err) = store.delete(name).await {
        warn!(blob = name, "failed to discard orphaned image: {err}");
    }
}

/// Remove a blob no longer referenced by any committed row. The database is
/// already consistent, so failure here is a warning, not a request error.
async fn release_blob(store: &dyn BlobStore, name: &str) {
    match store.delete(name).await {
        Ok(true) => {}
        Ok(false) => warn!(blob = name, "image already absent during cleanup"),
        Err(err) => warn!(blob = name, "failed to delete image: {err}"),
    }
}
