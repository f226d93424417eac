//! # Money Module
//!
//! Provides `Money` (integer cents) and `Discount` (basis points).
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    500.00 * 1.2 = 600.0000000000001                                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    50000 cents * 120 / 100 = 60000 cents                                │
//! │    Every rounding step is explicit and happens once per line            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use furnstock_core::money::{Discount, Money};
//!
//! let price: Money = "1299.50".parse().unwrap();
//! assert_eq!(price.cents(), 129_950);
//! assert_eq!(price.to_string(), "1299.50");
//!
//! let discount: Discount = "15".parse().unwrap();
//! assert_eq!(discount.bps(), 1500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (kopecks/cents).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  DeliveryItem.purchase_price ──► markup_price ──► Product.price         │
/// │                                                                         │
/// │  Product.price ──► effective_price(discount) ──► SaleItem.sale_price    │
/// │                                                      │                  │
/// │                                                      ▼                  │
/// │                                      line_total ──► Sale.total_amount   │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use furnstock_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use furnstock_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(60_000);
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 120_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies money by a quantity, `None` on i64 overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Report arithmetic: clamps at the i64 bounds instead of overflowing.
    #[inline]
    pub const fn saturating_multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    #[inline]
    pub const fn saturating_add(&self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// Scales the amount by `numerator / denominator`, rounding half away
    /// from zero.
    ///
    /// Used by the pricing engine for both discounts and markup. Computed in
    /// i128 so large amounts cannot overflow mid-calculation.
    pub fn scale_rounded(&self, numerator: i64, denominator: i64) -> Money {
        let product = self.0 as i128 * numerator as i128;
        let denominator = denominator as i128;
        let half = denominator / 2;
        let rounded = if product >= 0 {
            (product + half) / denominator
        } else {
            (product - half) / denominator
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal with two fractional digits ("1299.50"). Currency symbols
/// are added by the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Parses a decimal amount with at most two fractional digits.
///
/// Accepts `"500"`, `"500.5"`, `"500.50"` and a comma as decimal separator.
/// Never goes through floating point.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let normalized = digits.replace(',', ".");
        let (major_str, minor_str) = match normalized.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (normalized.as_str(), ""),
        };

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a decimal number like 1299.50"));
        }
        if minor_str.len() > 2 || !minor_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most two fractional digits allowed"));
        }

        let major: i64 = major_str
            .parse()
            .map_err(|_| invalid("amount is too large"))?;
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid("bad minor units"))? * 10,
            _ => minor_str.parse().map_err(|_| invalid("bad minor units"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Discount Type
// =============================================================================

/// A percentage discount stored in basis points (1500 = 15%).
///
/// ## Why Basis Points?
/// Discounts are entered as percentages ("15", "12.5") but stored as
/// integers so the price computation stays in integer math, the same way
/// money stays in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Discount(u32);

impl Discount {
    /// Upper bound: 100% off.
    pub const MAX_BPS: u32 = 10_000;

    /// No discount.
    pub const NONE: Discount = Discount(0);

    /// Creates a discount from basis points, rejecting values above 100%.
    pub fn try_from_bps(bps: u32) -> Result<Self, ValidationError> {
        if bps > Self::MAX_BPS {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(Discount(bps))
    }

    /// Creates a discount from whole percent, clamped to 100.
    ///
    /// ```rust
    /// use furnstock_core::money::Discount;
    ///
    /// assert_eq!(Discount::from_percent(10).bps(), 1000);
    /// assert_eq!(Discount::from_percent(250).bps(), 10_000);
    /// ```
    pub const fn from_percent(percent: u32) -> Self {
        let bps = percent.saturating_mul(100);
        if bps > Self::MAX_BPS {
            Discount(Self::MAX_BPS)
        } else {
            Discount(bps)
        }
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Shown as a percentage without trailing zeros: "15%", "12.5%".
impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}%", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

/// Parses a percentage ("15", "12.5", "7.25", optional trailing "%").
impl FromStr for Discount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%').trim();
        if trimmed.starts_with('-') {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: 100,
            });
        }
        // Same grammar as money: percent with two decimals is basis points.
        let as_money: Money = trimmed.parse().map_err(|_| ValidationError::InvalidFormat {
            field: "discount".to_string(),
            reason: format!("expected a percentage like 15 or 12.5, got '{}'", s.trim()),
        })?;
        let bps = u32::try_from(as_money.cents()).map_err(|_| ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        })?;
        Discount::try_from_bps(bps)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
