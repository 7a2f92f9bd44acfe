use serde::{Deserialize, Serialize};

use super::error::GridError;
use super::preview::{FieldUpdate, PreviewProduct};

/// Working collection of preview rows, addressed by position.
///
/// Rows have no stable identity until the backend stores them, so the grid
/// never reorders or filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewGrid {
    rows: Vec<PreviewProduct>,
}

/// Figures shown above the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewStats {
    pub total: usize,
    pub with_sizes: usize,
    pub with_detected_category: usize,
    /// Saturates at the `i64` bounds
    pub total_stock: i64,
}

impl PreviewGrid {
    pub fn new(rows: Vec<PreviewProduct>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PreviewProduct] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn update_field(&mut self, index: usize, update: FieldUpdate) -> Result<(), GridError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(GridError::RowOutOfRange { index, len })?;
        row.apply(update);
        Ok(())
    }

    /// Same as [`PreviewGrid::update_field`] for raw text coming from an input
    pub fn update_field_raw(
        &mut self,
        index: usize,
        field: &str,
        raw: &str,
    ) -> Result<(), GridError> {
        if index >= self.rows.len() {
            return Err(GridError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        self.update_field(index, FieldUpdate::parse(field, raw)?)
    }

    pub fn stats(&self) -> PreviewStats {
        self.rows.iter().fold(
            PreviewStats {
                total: self.rows.len(),
                ..Default::default()
            },
            |mut acc, row| {
                acc.with_sizes += usize::from(row.has_sizes);
                acc.with_detected_category += usize::from(row.detected_category.is_some());
                acc.total_stock = acc.total_stock.saturating_add(row.stock_quantity);
                acc
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> PreviewGrid {
        let mut a = PreviewProduct::new("Remera lisa", "R-1", 10.0);
        a.has_sizes = true;
        a.detected_category = Some("Indumentaria".into());
        a.stock_quantity = 3;

        let b = PreviewProduct::new("Taza", "T-1", 5.0);

        let mut c = PreviewProduct::new("Gorra", "G-1", 8.0);
        c.detected_category = Some("Accesorios".into());
        c.stock_quantity = 4;

        PreviewGrid::new(vec![a, b, c])
    }

    #[test]
    fn test_update_price_touches_only_target() {
        let mut g = grid();
        let before = g.clone();

        g.update_field(1, FieldUpdate::Price(42.0)).unwrap();

        assert_eq!(g.rows()[1].price, 42.0);
        assert_eq!(g.rows()[0], before.rows()[0]);
        assert_eq!(g.rows()[2], before.rows()[2]);
        assert_eq!(
            PreviewProduct {
                price: before.rows()[1].price,
                ..g.rows()[1].clone()
            },
            before.rows()[1]
        );
    }

    #[test]
    fn test_out_of_range_fails() {
        let mut g = grid();
        let before = g.clone();
        assert_eq!(
            g.update_field(3, FieldUpdate::Price(1.0)),
            Err(GridError::RowOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            g.update_field_raw(7, "price", "1"),
            Err(GridError::RowOutOfRange { index: 7, len: 3 })
        );
        assert_eq!(g, before);

        let mut empty = PreviewGrid::default();
        assert!(empty.update_field(0, FieldUpdate::HasSizes(true)).is_err());
    }

    #[test]
    fn test_update_from_raw_text() {
        let mut g = grid();
        g.update_field_raw(2, "stock_quantity", "12").unwrap();
        g.update_field_raw(2, "has_sizes", "true").unwrap();
        assert_eq!(g.rows()[2].stock_quantity, 12);
        assert!(g.rows()[2].has_sizes);

        assert!(matches!(
            g.update_field_raw(0, "price", "caro"),
            Err(GridError::InvalidValue { .. })
        ));
        assert_eq!(g.rows()[0].price, 10.0);
    }

    #[test]
    fn test_stats_follow_edits() {
        let mut g = grid();
        assert_eq!(
            g.stats(),
            PreviewStats {
                total: 3,
                with_sizes: 1,
                with_detected_category: 2,
                total_stock: 7,
            }
        );

        g.update_field(1, FieldUpdate::StockQuantity(5)).unwrap();
        g.update_field(1, FieldUpdate::HasSizes(true)).unwrap();
        let stats = g.stats();
        assert_eq!(stats.with_sizes, 2);
        assert_eq!(stats.total_stock, 12);
        assert_eq!(PreviewGrid::default().stats(), PreviewStats::default());
    }

    #[test]
    fn test_total_stock_saturates() {
        let mut g = grid();
        g.update_field_raw(0, "stock_quantity", "9223372036854775807")
            .unwrap();
        g.update_field_raw(1, "stock_quantity", "1").unwrap();
        assert_eq!(g.stats().total_stock, i64::MAX);
    }
}
