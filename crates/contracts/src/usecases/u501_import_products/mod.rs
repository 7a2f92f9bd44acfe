//! u501: product import from a spreadsheet
//!
//! Pipeline stages, in the order the page drives them:
//! file rules → preview upload → category detection → enrichment →
//! editable grid → confirmation. Everything in this module is free of I/O so
//! both the browser page and the backend share the same rules.

pub mod category_detector;
pub mod enrich;
pub mod error;
pub mod file_rules;
pub mod grid;
pub mod preview;
pub mod request;
pub mod response;
pub mod session;

pub use enrich::{enrich, CategoryHeuristics, KeywordHeuristics};
pub use error::{ApiFailure, FileSelectionError, GridError};
pub use file_rules::{FileSelector, SelectedFile, MAX_FILE_SIZE_BYTES};
pub use grid::{PreviewGrid, PreviewStats};
pub use preview::{FieldUpdate, PreviewProduct, ProductField};
pub use request::ImportConfirmRequest;
pub use response::{ApiErrorBody, ImportPreviewResponse, ImportResult, RowError};
pub use session::{Completion, ImportSession, RequestTicket};

use crate::usecases::common::UseCaseMetadata;

/// Multipart upload, answers with parsed preview rows
pub const PREVIEW_ENDPOINT: &str = "/products/import-preview";
/// JSON body `{ products }`, answers with an [`ImportResult`]
pub const CONFIRM_ENDPOINT: &str = "/products/import-confirm";
/// Known categories used to resolve detected category names to ids
pub const CATEGORIES_ENDPOINT: &str = "/categories";
/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "file";

pub struct ImportProductsUseCase;

impl UseCaseMetadata for ImportProductsUseCase {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "import_products"
    }

    fn display_name() -> &'static str {
        "Importar productos"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(ImportProductsUseCase::full_name(), "u501_import_products");
    }
}
