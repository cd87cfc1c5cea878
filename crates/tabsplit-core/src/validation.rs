//! # Validation Module
//!
//! Input validation utilities for Tab Split.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json)                                   │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Unknown fields rejected on update payloads                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Payload::validate()                                          │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store                                                         │
//! │  ├── Existence checks (session, item, participant)                     │
//! │  └── Same-session checks for assignments                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tabsplit_core::validation::{validate_quantity, validate_split_percentage};
//!
//! validate_quantity(2).unwrap();
//! validate_split_percentage(0.5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_NAME_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name (item name).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most MAX_NAME_LENGTH (200) characters
///
/// ## Example
/// ```rust
/// use tabsplit_core::validation::validate_name;
///
/// assert!(validate_name("name", "Margherita Pizza").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    validate_optional_name(field, Some(name))
}

/// Validates an optional name (guest name, restaurant name).
///
/// Absent and blank values pass; they are stored as `None`.
pub fn validate_optional_name(field: &str, name: Option<&str>) -> ValidationResult<()> {
    if let Some(name) = name {
        if name.trim().chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_NAME_LENGTH,
            });
        }
    }
    Ok(())
}

/// Trims an optional string and turns blank values into `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::out_of_range("quantity", 1, MAX_ITEM_QUANTITY));
    }

    Ok(())
}

/// Validates an amount in cents (price, tax, paid...).
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed MAX_AMOUNT_CENTS ($100M)
///
/// ## Example
/// ```rust
/// use tabsplit_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents("priceCents", 1099).is_ok());
/// assert!(validate_amount_cents("priceCents", 0).is_ok());    // comped item
/// assert!(validate_amount_cents("priceCents", -100).is_err());
/// assert!(validate_amount_cents("priceCents", i64::MAX / 2).is_err());
/// ```
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::out_of_range(field, 0, MAX_AMOUNT_CENTS));
    }

    Ok(())
}

/// Validates a split percentage, a fraction in [0, 1].
pub fn validate_split_percentage(pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() || !(0.0..=1.0).contains(&pct) {
        return Err(ValidationError::out_of_range("splitPercentage", 0, 1));
    }

    Ok(())
}

/// Validates a 1-based receipt line number.
pub fn validate_line_number(line: i64) -> ValidationResult<()> {
    if line <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "lineNumber".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
