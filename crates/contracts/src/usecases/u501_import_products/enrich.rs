use crate::domain::a001_category::Category;

use super::category_detector;
use super::preview::PreviewProduct;

/// Imported stock always starts at zero until a manual count-in
pub const IMPORTED_STOCK_QUANTITY: i64 = 0;
pub const IMPORTED_MIN_STOCK: i64 = 1;

/// The three lookups the enricher needs
pub trait CategoryHeuristics {
    fn detect_category(&self, product_name: &str) -> Option<String>;
    fn has_sizes(&self, product_name: &str) -> bool;
    fn resolve_category_id(&self, category_name: &str) -> Option<i64>;
}

/// Keyword tables from [`category_detector`] resolved against known categories
#[derive(Debug, Clone, Copy)]
pub struct KeywordHeuristics<'a> {
    categories: &'a [Category],
}

impl<'a> KeywordHeuristics<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        Self { categories }
    }
}

impl CategoryHeuristics for KeywordHeuristics<'_> {
    fn detect_category(&self, product_name: &str) -> Option<String> {
        category_detector::detect_from_product_name(product_name).map(str::to_string)
    }

    fn has_sizes(&self, product_name: &str) -> bool {
        category_detector::has_size_indicator(product_name)
    }

    fn resolve_category_id(&self, category_name: &str) -> Option<i64> {
        category_detector::resolve_category_id(category_name, self.categories)
    }
}

/// Merge heuristic output into a fresh copy of `rows`.
///
/// The product-name guess wins over `fallback_category` (usually derived from
/// the file name). Stock and min-stock are reset whatever the server sent.
pub fn enrich<H>(
    rows: &[PreviewProduct],
    fallback_category: Option<&str>,
    heuristics: &H,
) -> Vec<PreviewProduct>
where
    H: CategoryHeuristics + ?Sized,
{
    rows.iter()
        .map(|row| {
            let category = heuristics
                .detect_category(&row.name)
                .or_else(|| fallback_category.map(str::to_string));

            PreviewProduct {
                stock_quantity: IMPORTED_STOCK_QUANTITY,
                min_stock: IMPORTED_MIN_STOCK,
                category_id: category
                    .as_deref()
                    .and_then(|c| heuristics.resolve_category_id(c)),
                has_sizes: heuristics.has_sizes(&row.name),
                detected_category: category,
                ..row.clone()
            }
        })
        .collect()
}
