use serde::{Deserialize, Serialize};

use super::preview::PreviewProduct;

/// Answer of `POST /products/import-preview`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPreviewResponse {
    #[serde(default)]
    pub preview_data: Option<Vec<PreviewProduct>>,
}

impl ImportPreviewResponse {
    pub fn new(rows: Vec<PreviewProduct>) -> Self {
        Self {
            preview_data: Some(rows),
        }
    }

    /// Parsed rows; an absent `preview_data` is an empty collection
    pub fn into_rows(self) -> Vec<PreviewProduct> {
        self.preview_data.unwrap_or_default()
    }
}

/// Per-row failure reported by the confirm step (`row` is 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

/// Answer of `POST /products/import-confirm`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    #[serde(default)]
    pub import_log_id: Option<i64>,
    #[serde(default)]
    pub message: String,
    pub total_rows: usize,
    pub successful_rows: usize,
    pub failed_rows: usize,
    #[serde(default)]
    pub errors: Vec<RowError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_data: Option<Vec<PreviewProduct>>,
}

impl ImportResult {
    /// Partial success counts as success; failed rows are still listed in `errors`
    pub fn is_success(&self) -> bool {
        self.successful_rows > 0
    }

    pub fn is_partial(&self) -> bool {
        self.is_success() && self.failed_rows > 0
    }
}

/// Error envelope of every endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// `detail` of a raw error body, if it is JSON and carries a non-blank one
    pub fn detail_from(body: &str) -> Option<String> {
        serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .filter(|d| !d.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_preview_data_is_empty() {
        let resp: ImportPreviewResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.into_rows().is_empty());

        let resp: ImportPreviewResponse = serde_json::from_str(r#"{"preview_data":null}"#).unwrap();
        assert!(resp.into_rows().is_empty());
    }

    #[test]
    fn test_partial_success_is_success() {
        let result: ImportResult = serde_json::from_str(
            r#"{"total_rows":3,"successful_rows":2,"failed_rows":1,"errors":[{"row":2,"error":"SKU duplicado"}]}"#,
        )
        .unwrap();
        assert!(result.is_success());
        assert!(result.is_partial());
        assert_eq!(
            result.errors,
            vec![RowError {
                row: 2,
                error: "SKU duplicado".into()
            }]
        );
        assert_eq!(result.import_log_id, None);
    }

    #[test]
    fn test_nothing_imported_is_not_success() {
        let result = ImportResult {
            total_rows: 2,
            failed_rows: 2,
            ..Default::default()
        };
        assert!(!result.is_success());
        assert!(!result.is_partial());
    }

    #[test]
    fn test_detail_from_body() {
        assert_eq!(
            ApiErrorBody::detail_from(r#"{"detail":"Archivo vacío"}"#).as_deref(),
            Some("Archivo vacío")
        );
        assert_eq!(ApiErrorBody::detail_from(r#"{"detail":"  "}"#), None);
        assert_eq!(ApiErrorBody::detail_from("Internal Server Error"), None);
    }
}
