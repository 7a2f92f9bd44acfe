//! Page category constants.
//!
//! Every page declares an HTML `id` in the format `{entity}--{category}`
//! (e.g. `"u501_import_products--usecase"`) and a `data-page-category`
//! with one of the constants below. Copying the id from the DOM inspector
//! into a code search lands in the matching `usecases/` directory.

/// Use-case wizard / action page (imports, matching, etc.).
pub const PAGE_CAT_USECASE: &str = "usecase";

/// Validate that a page id matches the `{entity}--{category}` format.
pub fn is_valid_page_id(id: &str) -> bool {
    let parts: Vec<&str> = id.splitn(2, "--").collect();
    parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_format() {
        assert!(is_valid_page_id("u501_import_products--usecase"));
        assert!(!is_valid_page_id("u501_import_products"));
        assert!(!is_valid_page_id("--usecase"));
    }
}
