use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "machine")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub brand: String,
    pub model: Option<String>,

    /// Laser source type: FIBER, CO2, or DIODE.
    pub laser_type: String,
    pub is_mopa: bool,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
