//! Decimal money aggregation for order placement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Totals computed while placing an order.
///
/// `total` is always `subtotal + tax + shipping`. Tax and shipping are
/// currently fixed at zero; the fields exist as the extension point for
/// real calculations later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute order totals from (unit price, quantity) line pairs.
    #[must_use]
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, u32)>,
    {
        let subtotal: Decimal = lines
            .into_iter()
            .map(|(unit_price, quantity)| unit_price * Decimal::from(quantity))
            .sum();

        Self::from_subtotal(subtotal)
    }

    /// Build totals from a precomputed subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let tax = Decimal::ZERO;
        let shipping = Decimal::ZERO;

        Self {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().expect("valid decimal literal")
    }

    #[test]
    fn test_total_is_sum_of_line_totals() {
        let totals = OrderTotals::from_lines([(d("10.0"), 2), (d("3.50"), 4)]);
        assert_eq!(totals.subtotal, d("34.0"));
        assert_eq!(totals.total, d("34.0"));
    }

    #[test]
    fn test_tax_and_shipping_are_zero() {
        let totals = OrderTotals::from_lines([(d("19.99"), 1)]);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn test_empty_lines_yield_zero() {
        let totals = OrderTotals::from_lines(std::iter::empty());
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_decimal_precision_preserved() {
        // 0.1 * 3 == 0.3 exactly under decimal (would drift under f64)
        let totals = OrderTotals::from_lines([(d("0.1"), 3)]);
        assert_eq!(totals.total, d("0.3"));
    }
}
