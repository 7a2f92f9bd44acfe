use axum::{
    extract::{rejection::JsonRejection, Multipart},
    Json,
};
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_import_products::{
    ImportConfirmRequest, ImportPreviewResponse, ImportProductsUseCase, ImportResult, UPLOAD_FIELD,
};

use super::error::ApiError;
use crate::usecases::u501_import_products::{ImportError, ImportExecutor};

/// POST /products/import-preview
pub async fn import_preview(mut multipart: Multipart) -> Result<Json<ImportPreviewResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImportError::Upload(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ImportError::Upload(e.body_text()))?;

        tracing::info!(
            "{}: upload received '{}' ({} bytes)",
            ImportProductsUseCase::full_name(),
            file_name,
            bytes.len()
        );
        let response = ImportExecutor::new().preview(&file_name, &bytes).await?;
        return Ok(Json(response));
    }

    Err(ImportError::MissingFile.into())
}

/// POST /products/import-confirm
pub async fn import_confirm(
    payload: Result<Json<ImportConfirmRequest>, JsonRejection>,
) -> Result<Json<ImportResult>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(
        "{}: confirm with {} products",
        ImportProductsUseCase::full_name(),
        request.products.len()
    );
    let result = ImportExecutor::new().confirm(request.products).await?;
    Ok(Json(result))
}
