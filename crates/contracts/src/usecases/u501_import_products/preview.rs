use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::GridError;

/// Candidate product row parsed from an uploaded file, not yet persisted
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewProduct {
    /// Id of an existing product with the same SKU, if the backend found one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub price: f64,
    pub stock_quantity: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    /// Category inferred by keyword heuristics, distinct from `category_id`
    pub detected_category: Option<String>,
    pub min_stock: i64,
    pub has_sizes: bool,
}

impl PreviewProduct {
    pub fn new(name: impl Into<String>, sku: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            price,
            ..Default::default()
        }
    }

    /// Replace exactly one field
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Name(v) => self.name = v,
            FieldUpdate::Sku(v) => self.sku = v,
            FieldUpdate::Barcode(v) => self.barcode = v,
            FieldUpdate::Price(v) => self.price = v,
            FieldUpdate::StockQuantity(v) => self.stock_quantity = v,
            FieldUpdate::CategoryId(v) => self.category_id = v,
            FieldUpdate::MinStock(v) => self.min_stock = v,
            FieldUpdate::HasSizes(v) => self.has_sizes = v,
        }
    }
}

/// Editable columns of the preview grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Name,
    Sku,
    Barcode,
    Price,
    StockQuantity,
    CategoryId,
    MinStock,
    HasSizes,
}

impl ProductField {
    pub const ALL: [ProductField; 8] = [
        ProductField::Name,
        ProductField::Sku,
        ProductField::Barcode,
        ProductField::Price,
        ProductField::StockQuantity,
        ProductField::CategoryId,
        ProductField::MinStock,
        ProductField::HasSizes,
    ];

    /// Wire name, identical to the JSON key of [`PreviewProduct`]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Sku => "sku",
            ProductField::Barcode => "barcode",
            ProductField::Price => "price",
            ProductField::StockQuantity => "stock_quantity",
            ProductField::CategoryId => "category_id",
            ProductField::MinStock => "min_stock",
            ProductField::HasSizes => "has_sizes",
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductField {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| GridError::UnknownField(s.to_string()))
    }
}

/// Typed single-field edit of a preview row
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Name(String),
    Sku(String),
    Barcode(Option<String>),
    Price(f64),
    StockQuantity(i64),
    CategoryId(Option<i64>),
    MinStock(i64),
    HasSizes(bool),
}

impl FieldUpdate {
    pub fn field(&self) -> ProductField {
        match self {
            FieldUpdate::Name(_) => ProductField::Name,
            FieldUpdate::Sku(_) => ProductField::Sku,
            FieldUpdate::Barcode(_) => ProductField::Barcode,
            FieldUpdate::Price(_) => ProductField::Price,
            FieldUpdate::StockQuantity(_) => ProductField::StockQuantity,
            FieldUpdate::CategoryId(_) => ProductField::CategoryId,
            FieldUpdate::MinStock(_) => ProductField::MinStock,
            FieldUpdate::HasSizes(_) => ProductField::HasSizes,
        }
    }

    /// Build an update from the raw text of a grid input.
    ///
    /// Empty text clears optional fields. Prices accept a decimal comma.
    pub fn parse(field: &str, raw: &str) -> Result<Self, GridError> {
        let field: ProductField = field.parse()?;
        let value = raw.trim();
        let invalid = || GridError::InvalidValue {
            field,
            value: raw.to_string(),
        };

        let update = match field {
            ProductField::Name => FieldUpdate::Name(value.to_string()),
            ProductField::Sku => FieldUpdate::Sku(value.to_string()),
            ProductField::Barcode => {
                FieldUpdate::Barcode((!value.is_empty()).then(|| value.to_string()))
            }
            ProductField::Price => FieldUpdate::Price(
                value
                    .replace(',', ".")
                    .parse::<f64>()
                    .ok()
                    .filter(|p| p.is_finite())
                    .ok_or_else(invalid)?,
            ),
            ProductField::StockQuantity => {
                FieldUpdate::StockQuantity(value.parse().map_err(|_| invalid())?)
            }
            ProductField::MinStock => FieldUpdate::MinStock(value.parse().map_err(|_| invalid())?),
            ProductField::CategoryId => {
                if value.is_empty() {
                    FieldUpdate::CategoryId(None)
                } else {
                    FieldUpdate::CategoryId(Some(value.parse().map_err(|_| invalid())?))
                }
            }
            ProductField::HasSizes => FieldUpdate::HasSizes(match value {
                "true" | "1" | "on" | "si" | "sí" => true,
                "false" | "0" | "off" | "no" | "" => false,
                _ => return Err(invalid()),
            }),
        };
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let row: PreviewProduct =
            serde_json::from_str(r#"{"name":"Campera Negra","sku":"C-1","price":100}"#).unwrap();
        assert_eq!(row.id, None);
        assert_eq!(row.price, 100.0);
        assert_eq!(row.stock_quantity, 0);
        assert!(!row.has_sizes);
        assert!(row.detected_category.is_none());
    }

    #[test]
    fn test_id_is_omitted_when_absent() {
        let json = serde_json::to_value(PreviewProduct::new("Remera", "R-1", 10.0)).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["sku"], "R-1");
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in ProductField::ALL {
            assert_eq!(field.as_str().parse::<ProductField>().unwrap(), field);
        }
        assert!(matches!(
            "color".parse::<ProductField>(),
            Err(GridError::UnknownField(name)) if name == "color"
        ));
    }

    #[test]
    fn test_parse_price_with_decimal_comma() {
        assert_eq!(
            FieldUpdate::parse("price", " 1234,50 ").unwrap(),
            FieldUpdate::Price(1234.5)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            FieldUpdate::parse("stock_quantity", "doce"),
            Err(GridError::InvalidValue { field: ProductField::StockQuantity, .. })
        ));
        assert!(FieldUpdate::parse("price", "NaN").is_err());
        assert!(FieldUpdate::parse("has_sizes", "quizas").is_err());
    }

    #[test]
    fn test_parse_empty_clears_optionals() {
        assert_eq!(
            FieldUpdate::parse("barcode", "").unwrap(),
            FieldUpdate::Barcode(None)
        );
        assert_eq!(
            FieldUpdate::parse("category_id", "  ").unwrap(),
            FieldUpdate::CategoryId(None)
        );
        assert_eq!(
            FieldUpdate::parse("category_id", "7").unwrap(),
            FieldUpdate::CategoryId(Some(7))
        );
    }

    #[test]
    fn test_apply_touches_one_field() {
        let original = PreviewProduct::new("Buzo", "B-1", 50.0);
        let mut row = original.clone();
        row.apply(FieldUpdate::MinStock(4));
        assert_eq!(row.min_stock, 4);
        assert_eq!(
            PreviewProduct {
                min_stock: original.min_stock,
                ..row
            },
            original
        );
    }
}
