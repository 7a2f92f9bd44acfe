use axum::Json;
use contracts::domain::a001_category::Category;

use super::error::ApiError;
use crate::domain::a001_category;

/// GET /categories
pub async fn list_all() -> Result<Json<Vec<Category>>, ApiError> {
    let categories = a001_category::repository::list_all().await?;
    Ok(Json(categories))
}
