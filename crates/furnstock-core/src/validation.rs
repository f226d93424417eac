//! # Validation Module
//!
//! Input validation for catalog records and ledger requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap, FromStr for Money/Discount)       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - shape and range rules, run before any write     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Transaction - existence and stock checks (furnstock-db)       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite - UNIQUE, CHECK and FOREIGN KEY constraints            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use furnstock_core::validation::{validate_inn, validate_sku};
//!
//! assert!(validate_sku("SOFA-001").is_ok());
//! assert!(validate_inn("7701234567").is_ok());
//! assert!(validate_inn("77-01").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing::{checked_line_total, checked_total};
use crate::types::{NewDelivery, NewEmployee, NewProduct, NewSale, NewSupplier};
use crate::{MAX_AMOUNT_CENTS, MAX_INN_DIGITS, MAX_LINE_QUANTITY, MAX_SKU_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, `-`, `_`, `.` and `/` only (no whitespace)
///
/// SKUs are compared case-sensitively; "sofa-1" and "SOFA-1" are different.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, digits, '-', '_', '.' and '/'".to_string(),
        });
    }

    Ok(())
}

/// Validates a required free-text field (names, customer name).
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a line quantity: strictly positive, at most
/// [`MAX_LINE_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a price: strictly positive, at most [`MAX_AMOUNT_CENTS`].
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if price.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates an optional dimension: positive when present.
pub fn validate_dimension(field: &str, value: Option<f64>) -> ValidationResult<()> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(ValidationError::MustBePositive {
            field: field.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates a supplier INN (tax id): 1 to 12 ASCII digits.
pub fn validate_inn(inn: &str) -> ValidationResult<()> {
    let inn = inn.trim();

    if inn.is_empty() {
        return Err(ValidationError::Required {
            field: "inn".to_string(),
        });
    }

    if !inn.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "inn".to_string(),
            reason: "must contain digits only".to_string(),
        });
    }

    if inn.len() > MAX_INN_DIGITS {
        return Err(ValidationError::TooLong {
            field: "inn".to_string(),
            max: MAX_INN_DIGITS,
        });
    }

    Ok(())
}

/// Loose email check: one `@` with text on both sides and a dot in the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.trim().split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_required_text("name", &input.name)?;
    validate_sku(&input.sku)?;
    validate_required_text("category_id", &input.category_id)?;
    validate_price("price", input.price)?;
    validate_dimension("length", input.length)?;
    validate_dimension("width", input.width)?;
    validate_dimension("height", input.height)?;
    Ok(())
}

pub fn validate_new_supplier(input: &NewSupplier) -> ValidationResult<()> {
    validate_required_text("name", &input.name)?;
    validate_inn(&input.inn)?;
    if let Some(email) = input.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }
    Ok(())
}

pub fn validate_new_employee(input: &NewEmployee) -> ValidationResult<()> {
    validate_required_text("last_name", &input.last_name)?;
    validate_required_text("first_name", &input.first_name)?;
    Ok(())
}

/// Shape checks for a delivery request, run before the transaction opens.
///
/// Existence of the supplier and products is checked inside the transaction.
pub fn validate_delivery(input: &NewDelivery) -> ValidationResult<()> {
    validate_required_text("supplier_id", &input.supplier_id)?;

    if input.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    let mut total = Money::zero();
    for line in &input.items {
        validate_required_text("product_id", &line.product_id)?;
        validate_quantity(line.quantity)?;
        validate_price("purchase_price", line.purchase_price)?;
        total = checked_total(total, checked_line_total(line.purchase_price, line.quantity)?)?;
    }

    Ok(())
}

/// Shape checks for a sale request, run before the transaction opens.
pub fn validate_sale(input: &NewSale) -> ValidationResult<()> {
    validate_required_text("customer_name", &input.customer_name)?;

    if input.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for line in &input.items {
        validate_required_text("product_id", &line.product_id)?;
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Discount;
    use crate::types::{DeliveryLine, SaleLine};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SOFA-001").is_ok());
        assert!(validate_sku("tbl_oak.2/b").is_ok());

        assert!(matches!(validate_sku(""), Err(ValidationError::Required { .. })));
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(matches!(
            validate_sku(&"A".repeat(51)),
            Err(ValidationError::TooLong { max: 50, .. })
        ));
    }

    #[test]
    fn test_validate_quantity_and_price() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(MAX_LINE_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));

        assert!(validate_price("price", Money::from_cents(1)).is_ok());
        assert!(validate_price("price", Money::zero()).is_err());
        assert!(validate_price("price", Money::from_cents(-100)).is_err());
        assert!(validate_price("price", Money::from_cents(MAX_AMOUNT_CENTS)).is_ok());
        assert!(validate_price("price", Money::from_cents(MAX_AMOUNT_CENTS + 1)).is_err());
    }

    #[test]
    fn test_validate_dimension() {
        assert!(validate_dimension("length", None).is_ok());
        assert!(validate_dimension("length", Some(120.5)).is_ok());
        assert!(validate_dimension("length", Some(0.0)).is_err());
        assert!(validate_dimension("length", Some(-1.0)).is_err());
        assert!(validate_dimension("length", Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_validate_inn() {
        assert!(validate_inn("7701234567").is_ok());
        assert!(validate_inn("770123456789").is_ok());
        assert!(matches!(validate_inn(""), Err(ValidationError::Required { .. })));
        assert!(matches!(
            validate_inn("7701234567890"),
            Err(ValidationError::TooLong { .. })
        ));
        assert!(matches!(
            validate_inn("77O1"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("orders@mebel.example").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_validate_new_supplier_skips_blank_email() {
        let supplier = NewSupplier {
            name: "Mebel Plus".to_string(),
            inn: "7701234567".to_string(),
            email: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(validate_new_supplier(&supplier).is_ok());

        let nameless = NewSupplier {
            inn: "7701234567".to_string(),
            ..Default::default()
        };
        assert!(validate_new_supplier(&nameless).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let product = NewProduct::new("Sofa", "SOFA-1", "c-1", Money::from_cents(100_000));
        assert!(validate_new_product(&product).is_ok());

        let free = NewProduct::new("Sofa", "SOFA-1", "c-1", Money::zero());
        assert!(validate_new_product(&free).is_err());

        let mut flat = product.clone();
        flat.height = Some(0.0);
        assert!(validate_new_product(&flat).is_err());
    }

    #[test]
    fn test_validate_delivery() {
        let ok = NewDelivery {
            supplier_id: "s-1".to_string(),
            delivery_date: date(),
            items: vec![DeliveryLine::new("p-1", 10, Money::from_cents(50_000))],
        };
        assert!(validate_delivery(&ok).is_ok());

        let empty = NewDelivery {
            items: vec![],
            ..ok.clone()
        };
        assert!(matches!(
            validate_delivery(&empty),
            Err(ValidationError::Required { ref field }) if field == "items"
        ));

        let zero_qty = NewDelivery {
            items: vec![DeliveryLine::new("p-1", 0, Money::from_cents(50_000))],
            ..ok.clone()
        };
        assert!(validate_delivery(&zero_qty).is_err());

        let zero_price = NewDelivery {
            items: vec![DeliveryLine::new("p-1", 1, Money::zero())],
            ..ok.clone()
        };
        assert!(validate_delivery(&zero_price).is_err());

        // Each line is in range, the sum is not.
        let huge_total = NewDelivery {
            items: vec![
                DeliveryLine::new("p-1", 1, Money::from_cents(MAX_AMOUNT_CENTS)),
                DeliveryLine::new("p-2", 1, Money::from_cents(MAX_AMOUNT_CENTS)),
            ],
            ..ok.clone()
        };
        assert!(matches!(
            validate_delivery(&huge_total),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "total_amount"
        ));

        let huge_line = NewDelivery {
            items: vec![DeliveryLine::new("p-1", MAX_LINE_QUANTITY, Money::from_cents(MAX_AMOUNT_CENTS))],
            ..ok
        };
        assert!(matches!(
            validate_delivery(&huge_line),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "line_total"
        ));
    }

    #[test]
    fn test_validate_sale() {
        let ok = NewSale {
            customer_name: "Ivanov".to_string(),
            employee_id: None,
            sale_date: date(),
            items: vec![SaleLine::new("p-1", 2).with_discount(Discount::from_percent(5))],
        };
        assert!(validate_sale(&ok).is_ok());

        let anonymous = NewSale {
            customer_name: "  ".to_string(),
            ..ok.clone()
        };
        assert!(validate_sale(&anonymous).is_err());

        let empty = NewSale {
            items: vec![],
            ..ok.clone()
        };
        assert!(validate_sale(&empty).is_err());

        let negative = NewSale {
            items: vec![SaleLine::new("p-1", -1)],
            ..ok.clone()
        };
        assert!(validate_sale(&negative).is_err());

        let too_many = NewSale {
            items: vec![SaleLine::new("p-1", MAX_LINE_QUANTITY + 1)],
            ..ok
        };
        assert!(matches!(
            validate_sale(&too_many),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
