//! # Pricing Engine
//!
//! Pure price computations used by the delivery and sale transactions.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  Delivery                                                            │
//! │    purchase_price ──► markup_price (×1.20) ──► Product.price         │
//! │                                                                      │
//! │  Sale                                                                │
//! │    Product.price ──► effective_price (×(1-d)) ──► SaleItem.sale_price│
//! │    sale_price ──► line_total (×qty) ──► Sale.total_amount            │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rounding happens once per unit price, half away from zero. Line totals
//! are exact multiples of an already rounded unit price.

use crate::error::ValidationError;
use crate::money::{Discount, Money};
use crate::{MAX_AMOUNT_CENTS, RETAIL_MARKUP_BPS};

/// Price after applying an optional percentage discount.
///
/// Absent or zero discount returns `base_price` unchanged. Otherwise the
/// result is `round(base_price * (1 - d/100), 2)`.
///
/// ```rust
/// use furnstock_core::money::{Discount, Money};
/// use furnstock_core::pricing::effective_price;
///
/// let price = effective_price(Money::from_cents(100_000), Some(Discount::from_percent(10)));
/// assert_eq!(price.cents(), 90_000);
/// ```
pub fn effective_price(base_price: Money, discount: Option<Discount>) -> Money {
    match discount {
        Some(d) if !d.is_zero() => {
            let keep_bps = (Discount::MAX_BPS - d.bps()) as i64;
            base_price.scale_rounded(keep_bps, Discount::MAX_BPS as i64)
        }
        _ => base_price,
    }
}

/// Retail price derived from a supplier's purchase price: a fixed 20%
/// markup, `round(purchase_price * 1.2, 2)`.
pub fn markup_price(purchase_price: Money) -> Money {
    purchase_price.scale_rounded(RETAIL_MARKUP_BPS, 10_000)
}

/// Total for one line. Exact in cents.
#[inline]
pub fn line_total(unit_price: Money, quantity: i64) -> Money {
    unit_price.multiply_quantity(quantity)
}

/// Line total bounded by [`MAX_AMOUNT_CENTS`].
///
/// ```rust
/// use furnstock_core::money::Money;
/// use furnstock_core::pricing::checked_line_total;
///
/// assert_eq!(checked_line_total(Money::from_cents(50_000), 10).unwrap().cents(), 500_000);
/// assert!(checked_line_total(Money::from_cents(100_000), 100_000_000_000_000).is_err());
/// ```
pub fn checked_line_total(unit_price: Money, quantity: i64) -> Result<Money, ValidationError> {
    unit_price
        .checked_multiply_quantity(quantity)
        .filter(|amount| amount.cents() <= MAX_AMOUNT_CENTS)
        .ok_or_else(|| amount_out_of_range("line_total"))
}

/// Adds a line total to a running document total, bounded by
/// [`MAX_AMOUNT_CENTS`].
pub fn checked_total(total: Money, amount: Money) -> Result<Money, ValidationError> {
    total
        .checked_add(amount)
        .filter(|sum| sum.cents() <= MAX_AMOUNT_CENTS)
        .ok_or_else(|| amount_out_of_range("total_amount"))
}

fn amount_out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_AMOUNT_CENTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_discount_is_identity() {
        let base = Money::from_cents(12_345);
        assert_eq!(effective_price(base, None), base);
        assert_eq!(effective_price(base, Some(Discount::NONE)), base);
    }

    #[test]
    fn test_ten_percent_off_thousand() {
        let price = effective_price(Money::from_cents(100_000), Some(Discount::from_percent(10)));
        assert_eq!(price, Money::from_cents(90_000));
    }

    #[test]
    fn test_discount_rounds_half_away_from_zero() {
        // 0.05 * 0.9 = 0.045 -> 0.05
        assert_eq!(
            effective_price(Money::from_cents(5), Some(Discount::from_percent(10))).cents(),
            5
        );
        // 999.99 * 0.85 = 849.9915 -> 849.99
        assert_eq!(
            effective_price(Money::from_cents(99_999), Some(Discount::from_percent(15))).cents(),
            84_999
        );
        // 10.01 * 0.875 = 8.75875 -> 8.76
        let d = Discount::try_from_bps(1250).unwrap();
        assert_eq!(effective_price(Money::from_cents(1001), Some(d)).cents(), 876);
    }

    #[test]
    fn test_full_discount_is_free() {
        let price = effective_price(Money::from_cents(45_000), Some(Discount::from_percent(100)));
        assert!(price.is_zero());
    }

    #[test]
    fn test_effective_price_non_increasing_in_discount() {
        let bases = [1_i64, 99, 101, 12_345, 100_000, 999_999];
        for base in bases {
            let base = Money::from_cents(base);
            let mut previous = effective_price(base, None);
            for bps in (0..=10_000).step_by(25) {
                let d = Discount::try_from_bps(bps).unwrap();
                let price = effective_price(base, Some(d));
                assert!(price <= previous, "base {} bps {}", base, bps);
                assert!(price <= base);
                previous = price;
            }
        }
    }

    #[test]
    fn test_markup() {
        assert_eq!(markup_price(Money::from_cents(50_000)).cents(), 60_000);
        // 0.01 * 1.2 = 0.012 -> 0.01
        assert_eq!(markup_price(Money::from_cents(1)).cents(), 1);
        // 0.03 * 1.2 = 0.036 -> 0.04
        assert_eq!(markup_price(Money::from_cents(3)).cents(), 4);
        // 123.45 * 1.2 = 148.14
        assert_eq!(markup_price(Money::from_cents(12_345)).cents(), 14_814);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Money::from_cents(60_000), 2).cents(), 120_000);
        assert_eq!(line_total(Money::from_cents(199), 0).cents(), 0);
    }

    #[test]
    fn test_checked_totals_stay_bounded() {
        let max = Money::from_cents(MAX_AMOUNT_CENTS);
        assert_eq!(checked_line_total(max, 1).unwrap(), max);
        assert!(matches!(
            checked_line_total(max, 2),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "line_total"
        ));
        assert!(checked_line_total(Money::from_cents(100_000), 100_000_000_000_000).is_err());

        let total = checked_total(Money::zero(), Money::from_cents(500_000)).unwrap();
        assert_eq!(total.cents(), 500_000);
        assert!(matches!(
            checked_total(max, Money::from_cents(1)),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "total_amount"
        ));
    }
}
