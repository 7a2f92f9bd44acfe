pub mod a001_category;
pub mod error;
pub mod u501_import_products;
