use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMaterialRequest {
    /// Display name of the material.
    #[schema(example = "Stainless steel 304")]
    pub name: String,
    #[schema(example = "metal")]
    pub category: Option<String>,
    /// Stock thickness in mm.
    #[schema(example = 1.5)]
    pub thickness: Option<f64>,
    pub color: Option<String>,
}

/// Query string for material listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct MaterialListQuery {
    /// Restrict to materials already tested on this machine.
    pub machine_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MaterialResponse {
    pub id: i32,
    pub name: String,
    pub category: Option<String>,
    pub thickness: Option<f64>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::material::Model> for MaterialResponse {
    fn from(m: crate::entity::material::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            category: m.category,
            thickness: m.thickness,
            color: m.color,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_material(req: &CreateMaterialRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() || req.name.chars().count() > 128 {
        return Err(AppError::Validation("Name must be 1-128 characters".into()));
    }
    if let Some(t) = req.thickness
        && (!t.is_finite() || t <= 0.0)
    {
        return Err(AppError::Validation(
            "thickness must be a positive number of millimeters".into(),
        ));
    }
    Ok(())
}
