//! Keyword heuristics that guess a category and a "has sizes" flag.
//!
//! Matching is a plain substring test over the lower-cased input, and the
//! first category in table order wins. Short keywords can hit unrelated
//! words ("top" inside "laptop"); that is how the heuristic behaves and the
//! user fixes such rows in the grid.

use crate::domain::a001_category::Category;

pub const CATEGORY_CLOTHING: &str = "Indumentaria";
pub const CATEGORY_FOOTWEAR: &str = "Calzado";
pub const CATEGORY_ACCESSORIES: &str = "Accesorios";

type KeywordTable = [(&'static str, &'static [&'static str])];

static FILENAME_KEYWORDS: &KeywordTable = &[
    (
        CATEGORY_CLOTHING,
        &[
            "indumentaria", "ropa", "remera", "camiseta", "camisa", "pantalon", "pantalón", "buzo",
            "campera", "textil",
        ],
    ),
    (
        CATEGORY_FOOTWEAR,
        &["calzado", "zapatilla", "zapato", "bota", "sandalia"],
    ),
    (
        CATEGORY_ACCESSORIES,
        &[
            "accesorio", "gorra", "cinturon", "cinturón", "bolso", "mochila", "billetera", "bijou",
        ],
    ),
];

static PRODUCT_NAME_KEYWORDS: &KeywordTable = &[
    (
        CATEGORY_CLOTHING,
        &[
            "remera", "camiseta", "camisa", "musculosa", "pantalon", "pantalón", "jean", "jogger",
            "calza", "short", "bermuda", "buzo", "sweater", "sueter", "suéter", "campera",
            "chaqueta", "chaleco", "vestido", "pollera", "falda", "top",
        ],
    ),
    (
        CATEGORY_FOOTWEAR,
        &[
            "zapatilla", "zapato", "bota", "botin", "botín", "sandalia", "ojota", "mocasin",
            "mocasín", "pantufla",
        ],
    ),
    (
        CATEGORY_ACCESSORIES,
        &[
            "gorra", "gorro", "cinturon", "cinturón", "bolso", "mochila", "billetera", "cartera",
            "riñonera", "lentes", "anteojos", "reloj", "bufanda", "guante", "pulsera", "collar",
        ],
    ),
];

/// Garments and footwear sold by size
static SIZE_KEYWORDS: &[&str] = &[
    "remera", "camiseta", "camisa", "musculosa", "pantalon", "pantalón", "jean", "jogger", "calza",
    "short", "bermuda", "buzo", "sweater", "sueter", "suéter", "campera", "chaqueta", "chaleco",
    "vestido", "pollera", "falda", "zapatilla", "zapato", "bota", "botin", "botín", "sandalia",
    "ojota", "mocasin", "mocasín", "talle",
];

fn first_match(text: &str, table: &KeywordTable) -> Option<&'static str> {
    let lower = text.to_lowercase();
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
}

/// Category hinted by the uploaded file name, used as fallback for every row
pub fn detect_from_filename(file_name: &str) -> Option<&'static str> {
    first_match(file_name, FILENAME_KEYWORDS)
}

pub fn detect_from_product_name(product_name: &str) -> Option<&'static str> {
    first_match(product_name, PRODUCT_NAME_KEYWORDS)
}

pub fn has_size_indicator(product_name: &str) -> bool {
    let lower = product_name.to_lowercase();
    SIZE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Id of the first known category whose name contains `category_name`
/// (case-insensitive). A blank name resolves to nothing.
pub fn resolve_category_id(category_name: &str, categories: &[Category]) -> Option<i64> {
    let needle = category_name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    categories
        .iter()
        .find(|c| c.name.to_lowercase().contains(&needle))
        .map(|c| c.id)
}
