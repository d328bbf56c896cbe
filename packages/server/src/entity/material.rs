use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "material")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub category: Option<String>,
    /// Stock thickness in mm.
    pub thickness: Option<f64>,
    pub color: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
