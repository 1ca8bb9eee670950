use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Tax rate applied to sales orders. The processors are the single source of
/// truth for rates; any screen-side derived total that disagrees is a display
/// bug, not an input.
pub const SALES_TAX_RATE: Decimal = dec!(0.10);

/// Tax rate applied to purchase orders.
pub const PURCHASE_TAX_RATE: Decimal = dec!(0.10);

/// Quantity and unit-price pair of one order line, as seen by the
/// calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmount {
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Derived money fields of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Computes subtotal, tax and total for an order with exact decimal
/// arithmetic. No rounding happens here; rounding, if any, is a display
/// concern. An empty item list yields all zeros (the processors still reject
/// empty orders as invalid input).
pub fn compute_order_totals(items: &[LineAmount], rate: Decimal) -> OrderTotals {
    let subtotal: Decimal = items
        .iter()
        .map(|item| Decimal::from(item.quantity) * item.unit_price)
        .sum();
    let tax = subtotal * rate;
    OrderTotals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line(quantity: i32, unit_price: Decimal) -> LineAmount {
        LineAmount {
            quantity,
            unit_price,
        }
    }

    #[test]
    fn single_item_totals() {
        let totals = compute_order_totals(&[line(1, dec!(79.99))], dec!(0.10));
        assert_eq!(totals.subtotal, dec!(79.99));
        assert_eq!(totals.tax, dec!(7.999));
        assert_eq!(totals.total, dec!(87.989));
    }

    #[test]
    fn multiple_item_totals() {
        let totals = compute_order_totals(
            &[line(1, dec!(79.99)), line(1, dec!(49.99))],
            dec!(0.10),
        );
        assert_eq!(totals.subtotal, dec!(129.98));
        assert_eq!(totals.tax, dec!(12.998));
        assert_eq!(totals.total, dec!(142.978));
    }

    #[test]
    fn quantity_scales_the_line() {
        let totals = compute_order_totals(&[line(3, dec!(10.50))], dec!(0.20));
        assert_eq!(totals.subtotal, dec!(31.50));
        assert_eq!(totals.tax, dec!(6.30));
        assert_eq!(totals.total, dec!(37.80));
    }

    #[test]
    fn empty_items_yield_zero() {
        let totals = compute_order_totals(&[], dec!(0.10));
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn deterministic_for_same_input() {
        let items = [line(2, dec!(12.34)), line(5, dec!(0.99))];
        let first = compute_order_totals(&items, SALES_TAX_RATE);
        let second = compute_order_totals(&items, SALES_TAX_RATE);
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn totals_are_internally_consistent(
            lines in proptest::collection::vec((1i32..100, 1i64..100_000), 1..10)
        ) {
            let items: Vec<LineAmount> = lines
                .iter()
                .map(|(quantity, cents)| line(*quantity, Decimal::new(*cents, 2)))
                .collect();
            let rate = dec!(0.10);
            let totals = compute_order_totals(&items, rate);

            let expected_subtotal: Decimal = items
                .iter()
                .map(|i| Decimal::from(i.quantity) * i.unit_price)
                .sum();
            prop_assert_eq!(totals.subtotal, expected_subtotal);
            prop_assert_eq!(totals.tax, totals.subtotal * rate);
            prop_assert_eq!(totals.total, totals.subtotal + totals.tax);
        }
    }
}
