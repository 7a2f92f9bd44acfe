use chrono::Utc;
use contracts::usecases::u501_import_products::RowError;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, EntityTrait, Set};
use serde::{Deserialize, Serialize};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_import_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub total_rows: i64,
    pub successful_rows: i64,
    pub failed_rows: i64,
    /// JSON array of `RowError`
    pub errors_json: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn insert(
    total_rows: usize,
    successful_rows: usize,
    errors: &[RowError],
) -> anyhow::Result<i64> {
    let active = ActiveModel {
        id: NotSet,
        total_rows: Set(total_rows as i64),
        successful_rows: Set(successful_rows as i64),
        failed_rows: Set(errors.len() as i64),
        errors_json: Set(serde_json::to_string(errors)?),
        created_at: Set(Utc::now()),
    };
    let model = active.insert(conn()).await?;
    Ok(model.id)
}

pub async fn get_by_id(id: i64) -> anyhow::Result<Option<Model>> {
    Ok(Entity::find_by_id(id).one(conn()).await?)
}
