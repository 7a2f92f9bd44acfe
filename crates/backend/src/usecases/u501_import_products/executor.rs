use super::{error::ImportError, parser};
use crate::domain::{a001_category, a002_product, a003_import_log};
use anyhow::Result;
use contracts::usecases::u501_import_products::{
    category_detector::resolve_category_id, file_rules::validate_upload, ImportPreviewResponse,
    ImportResult, PreviewProduct, RowError,
};
use std::collections::HashSet;

/// Runs the product import use case against the database
pub struct ImportExecutor;

impl ImportExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Parse an upload into preview rows without writing anything.
    ///
    /// Rows whose SKU is already in the catalogue carry that product's id;
    /// a category column is resolved against the known categories.
    pub async fn preview(&self, file_name: &str, bytes: &[u8]) -> Result<ImportPreviewResponse> {
        validate_upload(file_name, bytes.len() as u64).map_err(ImportError::from)?;
        let mut rows = parser::parse_upload(file_name, bytes)?;

        let skus: Vec<String> = rows.iter().map(|r| r.sku.trim().to_string()).collect();
        let existing = a002_product::repository::ids_by_skus(&skus).await?;
        let categories = a001_category::repository::list_all().await?;

        for row in rows.iter_mut() {
            row.id = existing.get(row.sku.trim()).copied();
            row.category_id = row
                .category_name
                .as_deref()
                .and_then(|name| resolve_category_id(name, &categories));
        }

        tracing::info!(
            "Preview of '{}': {} rows, {} already in catalogue",
            file_name,
            rows.len(),
            rows.iter().filter(|r| r.id.is_some()).count()
        );
        Ok(ImportPreviewResponse::new(rows))
    }

    /// Validate and upsert every row, then record the import log.
    ///
    /// A failing row is reported with its 1-based position and does not stop
    /// the rest of the batch.
    pub async fn confirm(&self, products: Vec<PreviewProduct>) -> Result<ImportResult> {
        if products.is_empty() {
            return Err(ImportError::EmptyBatch.into());
        }

        let total_rows = products.len();
        let mut successful_rows = 0;
        let mut errors = Vec::new();
        let mut seen_skus = HashSet::new();

        for (idx, product) in products.iter().enumerate() {
            let row = idx + 1;
            if let Err(error) = validate_row(product, &mut seen_skus) {
                errors.push(RowError { row, error });
                continue;
            }
            match upsert(product).await {
                Ok(id) => {
                    tracing::debug!("Row {} saved as product {}", row, id);
                    successful_rows += 1;
                }
                Err(e) => {
                    tracing::warn!("Row {} (SKU {}) failed: {}", row, product.sku, e);
                    errors.push(RowError {
                        row,
                        error: format!("Error al guardar: {}", e),
                    });
                }
            }
        }

        let import_log_id = a003_import_log::repository::insert(total_rows, successful_rows, &errors).await?;
        tracing::info!(
            "Import {} finished: {} of {} rows saved",
            import_log_id,
            successful_rows,
            total_rows
        );

        Ok(ImportResult {
            import_log_id: Some(import_log_id),
            message: format!(
                "Importación finalizada: {} de {} productos importados",
                successful_rows, total_rows
            ),
            total_rows,
            successful_rows,
            failed_rows: errors.len(),
            errors,
            preview_data: None,
        })
    }
}

impl Default for ImportExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Business checks on one row; `seen_skus` tracks SKUs earlier in the batch
fn validate_row(product: &PreviewProduct, seen_skus: &mut HashSet<String>) -> Result<(), String> {
    if product.name.trim().is_empty() {
        return Err("El nombre es obligatorio".to_string());
    }
    let sku = product.sku.trim();
    if sku.is_empty() {
        return Err("El SKU es obligatorio".to_string());
    }
    if !product.price.is_finite() || product.price < 0.0 {
        return Err("El precio no puede ser negativo".to_string());
    }
    if product.stock_quantity < 0 {
        return Err("El stock no puede ser negativo".to_string());
    }
    if product.min_stock < 0 {
        return Err("El stock mínimo no puede ser negativo".to_string());
    }
    if !seen_skus.insert(sku.to_lowercase()) {
        return Err("SKU duplicado".to_string());
    }
    Ok(())
}

/// Update by id, then by SKU, else insert
async fn upsert(product: &PreviewProduct) -> Result<i64> {
    if let Some(id) = product.id {
        if let Some(existing) = a002_product::repository::get_by_id(id).await? {
            return a002_product::repository::update_from_import(existing, product).await;
        }
    }
    if let Some(existing) = a002_product::repository::find_by_sku(product.sku.trim()).await? {
        return a002_product::repository::update_from_import(existing, product).await;
    }
    a002_product::repository::insert(product).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::initialize_database;

    fn row(name: &str, sku: &str, price: f64) -> PreviewProduct {
        PreviewProduct::new(name, sku, price)
    }

    #[test]
    fn test_validate_row_rules() {
        let mut seen = HashSet::new();
        assert!(validate_row(&row("Remera", "R-1", 10.0), &mut seen).is_ok());
        assert_eq!(
            validate_row(&row("Remera lisa", "r-1", 12.0), &mut seen),
            Err("SKU duplicado".to_string())
        );
        assert_eq!(
            validate_row(&row("  ", "R-2", 1.0), &mut seen),
            Err("El nombre es obligatorio".to_string())
        );
        assert_eq!(
            validate_row(&row("Gorra", "", 1.0), &mut seen),
            Err("El SKU es obligatorio".to_string())
        );
        assert_eq!(
            validate_row(&row("Gorra", "G-1", -5.0), &mut seen),
            Err("El precio no puede ser negativo".to_string())
        );

        let mut negative_stock = row("Gorra", "G-1", 5.0);
        negative_stock.stock_quantity = -1;
        assert!(validate_row(&negative_stock, &mut seen).is_err());
        // rejected rows do not reserve their SKU
        assert!(validate_row(&row("Gorra", "G-1", 5.0), &mut seen).is_ok());
    }

    // The only test in the crate that opens the global connection.
    #[tokio::test]
    async fn test_preview_and_confirm_against_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("import.db");
        initialize_database(Some(db_path.to_str().unwrap()))
            .await
            .unwrap();
        let executor = ImportExecutor::new();

        let csv = "nombre,sku,precio,categoria\n\
                   Campera Negra,CAM-01,\"15999,90\",Indumentaria\n\
                   Bota Texana,BOT-01,20000,calzado\n";
        let preview = executor.preview("Invierno.csv", csv.as_bytes()).await.unwrap();
        let rows = preview.into_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, None);
        assert_eq!(rows[0].price, 15999.9);
        assert_eq!(rows[0].category_id, Some(1));
        assert_eq!(rows[1].category_id, Some(2));

        let mut batch = rows.clone();
        batch.push(row("Campera duplicada", "CAM-01", 1.0));
        batch.push(row("Cinturón", "CIN-01", -3.0));
        let result = executor.confirm(batch).await.unwrap();
        assert_eq!(result.total_rows, 4);
        assert_eq!(result.successful_rows, 2);
        assert_eq!(result.failed_rows, 2);
        assert_eq!(result.errors[0].row, 3);
        assert_eq!(result.errors[0].error, "SKU duplicado");
        assert_eq!(result.errors[1].row, 4);
        assert!(result.is_success());
        assert!(result.is_partial());
        assert_eq!(
            result.message,
            "Importación finalizada: 2 de 4 productos importados"
        );
        let log_id = result.import_log_id.unwrap();
        let log = a003_import_log::repository::get_by_id(log_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(log.failed_rows, 2);

        // a second upload of the same SKU now points at the saved product
        let again = executor
            .preview("Invierno.csv", "name,sku,price\nCampera Negra,CAM-01,17000\n".as_bytes())
            .await
            .unwrap()
            .into_rows();
        let saved = a002_product::repository::find_by_sku("CAM-01")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again[0].id, Some(saved.id));

        // far more SKUs than SQLite accepts as bind variables in one query
        let mut big = String::from("nombre,sku,precio\n");
        for i in 0..40_000 {
            big.push_str(&format!("Articulo {i},ART-{i},100\n"));
        }
        big.push_str("Campera Negra,CAM-01,17000\n");
        let big_rows = executor
            .preview("lista.csv", big.as_bytes())
            .await
            .unwrap()
            .into_rows();
        assert_eq!(big_rows.len(), 40_001);
        assert_eq!(big_rows[0].id, None);
        assert_eq!(big_rows[40_000].id, Some(saved.id));

        let mut update = again[0].clone();
        update.stock_quantity = 0;
        let result = executor.confirm(vec![update]).await.unwrap();
        assert_eq!(result.successful_rows, 1);
        let updated = a002_product::repository::get_by_id(saved.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.price, 17000.0);
        assert_eq!(updated.stock_quantity, saved.stock_quantity);

        let empty = executor.confirm(Vec::new()).await.unwrap_err();
        assert!(matches!(
            empty.downcast_ref::<ImportError>(),
            Some(ImportError::EmptyBatch)
        ));
    }
}
