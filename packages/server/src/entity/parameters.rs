use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Engraving settings for a test. Strictly 1:1 with `test`: the primary key
/// IS the owning test id, and both rows are written in one transaction.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parameters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub test_id: i32,

    #[sea_orm(belongs_to, from = "test_id", to = "id")]
    pub test: Option<super::test::Entity>,

    /// Marking speed in mm/s.
    pub speed: f64,
    /// Laser power in percent.
    pub power: f64,
    /// Pulse frequency in kHz.
    pub frequency: f64,
    /// Pulse duration in ns (MOPA sources only).
    pub pulse: Option<f64>,
    /// Focus offset in mm.
    pub z_offset: f64,
    pub nb_passes: i32,
    pub sweep: i32,
    pub hatch: f64,
    /// Line spacing in mm.
    pub row_interval: f64,
    pub wobble: f64,
}

impl ActiveModelBehavior for ActiveModel {}
