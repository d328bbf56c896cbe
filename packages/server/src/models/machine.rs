use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Laser source families carried by the catalog.
const LASER_TYPES: &[&str] = &["FIBER", "CO2", "DIODE"];

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMachineRequest {
    /// Display name of the machine.
    #[schema(example = "LaserPecker 4")]
    pub name: String,
    #[schema(example = "LaserPecker")]
    pub brand: String,
    pub model: Option<String>,
    /// One of FIBER, CO2, DIODE.
    #[schema(example = "FIBER")]
    pub laser_type: String,
    /// Whether the source is a MOPA fiber (adjustable pulse duration).
    #[serde(default)]
    pub is_mopa: bool,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateMachineRequest {
    pub name: String,
    pub brand: String,
    pub model: Option<String>,
    pub laser_type: String,
    #[serde(default)]
    pub is_mopa: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MachineResponse {
    pub id: i32,
    pub name: String,
    pub brand: String,
    pub model: Option<String>,
    pub laser_type: String,
    pub is_mopa: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::machine::Model> for MachineResponse {
    fn from(m: crate::entity::machine::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            brand: m.brand,
            model: m.model,
            laser_type: m.laser_type,
            is_mopa: m.is_mopa,
            created_at: m.created_at,
        }
    }
}

pub fn validate_machine_fields(name: &str, brand: &str, laser_type: &str) -> Result<(), AppError> {
    if name.trim().is_empty() || name.chars().count() > 128 {
        return Err(AppError::Validation("Name must be 1-128 characters".into()));
    }
    if brand.trim().is_empty() || brand.chars().count() > 128 {
        return Err(AppError::Validation(
            "Brand must be 1-128 characters".into(),
        ));
    }
    if !LASER_TYPES.contains(&laser_type) {
        return Err(AppError::Validation(
            "laser_type must be one of: FIBER, CO2, DIODE".into(),
        ));
    }
    Ok(())
}
