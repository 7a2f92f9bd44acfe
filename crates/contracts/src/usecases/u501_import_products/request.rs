use serde::{Deserialize, Serialize};

use super::preview::PreviewProduct;

/// Body of `POST /products/import-confirm`: the whole edited grid in one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportConfirmRequest {
    pub products: Vec<PreviewProduct>,
}
