use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use contracts::usecases::u501_import_products::{
    CATEGORIES_ENDPOINT, CONFIRM_ENDPOINT, MAX_FILE_SIZE_BYTES, PREVIEW_ENDPOINT,
};

use crate::handlers;

/// Room for the multipart envelope around a maximum-size file
const UPLOAD_BODY_LIMIT: usize = MAX_FILE_SIZE_BYTES as usize + 1024 * 1024;

/// Shortest CSV row that still yields a product (`a,b` plus newline)
const MIN_UPLOAD_ROW_BYTES: usize = 4;
/// Generous size of one serialized preview row with its cell text
const MAX_ROW_JSON_BYTES: usize = 320;
/// Room for the whole grid a maximum-size upload can preview
const CONFIRM_BODY_LIMIT: usize =
    MAX_FILE_SIZE_BYTES as usize / MIN_UPLOAD_ROW_BYTES * MAX_ROW_JSON_BYTES;

/// All application routes
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(CATEGORIES_ENDPOINT, get(handlers::a001_category::list_all))
        // ========================================
        // U501 IMPORT PRODUCTS
        // ========================================
        .route(
            PREVIEW_ENDPOINT,
            post(handlers::u501_import_products::import_preview)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            CONFIRM_ENDPOINT,
            post(handlers::u501_import_products::import_confirm)
                .layer(DefaultBodyLimit::max(CONFIRM_BODY_LIMIT)),
        )
}
