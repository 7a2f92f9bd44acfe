use chrono::Utc;
use contracts::usecases::u501_import_products::PreviewProduct;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub price: f64,
    pub stock_quantity: i64,
    pub min_stock: i64,
    pub category_id: Option<i64>,
    pub has_sizes: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn get_by_id(id: i64) -> anyhow::Result<Option<Model>> {
    Ok(Entity::find_by_id(id).one(conn()).await?)
}

pub async fn find_by_sku(sku: &str) -> anyhow::Result<Option<Model>> {
    Ok(Entity::find()
        .filter(Column::Sku.eq(sku))
        .one(conn())
        .await?)
}

/// SKUs bound per `IN (...)` query; SQLite caps the number of bind variables
const SKU_LOOKUP_CHUNK: usize = 500;

/// Existing product ids keyed by SKU, for the given SKUs only
pub async fn ids_by_skus(skus: &[String]) -> anyhow::Result<HashMap<String, i64>> {
    let mut ids = HashMap::new();
    for chunk in skus.chunks(SKU_LOOKUP_CHUNK) {
        let found = Entity::find()
            .filter(Column::Sku.is_in(chunk.iter().cloned()))
            .all(conn())
            .await?;
        ids.extend(found.into_iter().map(|m| (m.sku, m.id)));
    }
    Ok(ids)
}

/// New product from an import row; returns the assigned id
pub async fn insert(row: &PreviewProduct) -> anyhow::Result<i64> {
    let now = Utc::now();
    let active = ActiveModel {
        id: NotSet,
        name: Set(row.name.trim().to_string()),
        sku: Set(row.sku.trim().to_string()),
        barcode: Set(row.barcode.clone()),
        price: Set(row.price),
        stock_quantity: Set(row.stock_quantity),
        min_stock: Set(row.min_stock),
        category_id: Set(row.category_id),
        has_sizes: Set(row.has_sizes),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
    };
    let model = active.insert(conn()).await?;
    Ok(model.id)
}

/// Overwrite catalogue fields of an existing product from an import row.
///
/// Stock on hand is left as counted; the import only carries the catalogue.
pub async fn update_from_import(existing: Model, row: &PreviewProduct) -> anyhow::Result<i64> {
    let id = existing.id;
    let mut active: ActiveModel = existing.into();
    active.name = Set(row.name.trim().to_string());
    active.sku = Set(row.sku.trim().to_string());
    active.barcode = Set(row.barcode.clone());
    active.price = Set(row.price);
    active.min_stock = Set(row.min_stock);
    active.category_id = Set(row.category_id);
    active.has_sizes = Set(row.has_sizes);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn()).await?;
    Ok(id)
}
