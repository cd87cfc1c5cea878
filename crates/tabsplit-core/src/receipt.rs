//! # Receipt Module
//!
//! Parsed receipt data and the arithmetic sanity check run on it.
//!
//! ## Receipt Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  image bytes ──► ImageFormat::detect ──► vision model (tabsplit-scan)   │
//! │                                                │                        │
//! │                                                ▼                        │
//! │                                     ParsedReceipt (decimals)            │
//! │                                                │                        │
//! │                                                ▼                        │
//! │                               validate_receipt() ← THIS MODULE          │
//! │                                                │                        │
//! │                                                ▼                        │
//! │                    Receipt view (cents) + ReceiptValidation             │
//! │                                                │                        │
//! │                                                ▼                        │
//! │                  to_item_drafts() ──► BillItemCreate for a session      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Validation Rules
//! | Rule | Outcome |
//! |------|---------|
//! | no items | issue |
//! | no total | warning |
//! | subtotal + tax + tip ≠ total (beyond 2 cents) | issue |
//! | Σ price × qty ≠ subtotal (beyond 2 cents) | warning |
//!
//! The validator never fails; `is_valid` is simply "no issues".

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::money::Money;
use crate::payloads::BillItemCreate;
use crate::RECEIPT_TOLERANCE_CENTS;

// =============================================================================
// Parsed Receipt (model output)
// =============================================================================

/// The vision model's self-reported certainty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    /// Anything the model made up outside the three levels.
    #[serde(other)]
    Unknown,
}

/// One line as the model reported it. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedLineItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    /// Kept as a float: models sometimes answer `1.0`.
    #[serde(default)]
    pub quantity: Option<f64>,
}

impl ParsedLineItem {
    /// Quantity as a whole number for item drafts: missing, zero or
    /// negative means 1.
    pub fn quantity_or_default(&self) -> i64 {
        match self.quantity.map(|q| q.round() as i64) {
            Some(q) if q > 0 => q,
            _ => 1,
        }
    }

    /// Raw quantity for arithmetic checks: missing or zero means 1.
    pub fn raw_quantity(&self) -> f64 {
        match self.quantity {
            Some(q) if q != 0.0 => q,
            _ => 1.0,
        }
    }

    /// Unit price in cents; missing or unrepresentable prices become zero.
    pub fn price_money(&self) -> Money {
        self.price.and_then(Money::from_decimal).unwrap_or_default()
    }
}

/// The JSON object the vision model returns, in its own snake_case shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<ParsedLineItem>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub tip: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub confidence: Option<Confidence>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ParsedReceipt {
    /// Converts each line into a create payload for a session.
    ///
    /// Missing names become "Unknown Item", missing prices 0 and the line
    /// number is the 1-based position in the list.
    pub fn to_item_drafts(&self) -> Vec<BillItemCreate> {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, line)| BillItemCreate {
                name: line
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or("Unknown Item")
                    .to_string(),
                price_cents: line.price_money().cents().max(0),
                quantity: line.quantity_or_default(),
                category: None,
                line_number: Some(idx as i64 + 1),
            })
            .collect()
    }

    /// Σ price × quantity over all lines, on the raw decimals, rounded to
    /// cents once at the end.
    ///
    /// `None` when the sum cannot be represented in cents.
    pub fn items_sum(&self) -> Option<Money> {
        let sum: f64 = self
            .items
            .iter()
            .map(|line| line.price.unwrap_or(0.0) * line.raw_quantity())
            .sum();
        Money::from_decimal(sum)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Outcome of the arithmetic sanity check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptValidation {
    pub is_valid: bool,
    /// Serious problems; any issue makes the receipt invalid.
    pub issues: Vec<String>,
    /// Advisory notes.
    pub warnings: Vec<String>,
}

/// Cross-checks a parsed receipt's arithmetic.
///
/// ## Example
/// ```rust
/// use tabsplit_core::receipt::{validate_receipt, ParsedLineItem, ParsedReceipt};
///
/// let receipt = ParsedReceipt {
///     items: vec![ParsedLineItem { name: None, price: Some(10.0), quantity: Some(1.0) }],
///     subtotal: Some(10.0),
///     tax: Some(1.0),
///     tip: Some(2.0),
///     total: Some(13.0),
///     ..Default::default()
/// };
///
/// let validation = validate_receipt(&receipt);
/// assert!(validation.is_valid);
/// assert!(validation.warnings.is_empty());
/// ```
pub fn validate_receipt(receipt: &ParsedReceipt) -> ReceiptValidation {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    let subtotal = amount("Subtotal", receipt.subtotal, &mut warnings);
    let tax = amount("Tax", receipt.tax, &mut warnings);
    let tip = amount("Tip", receipt.tip, &mut warnings).unwrap_or_default();
    let total = amount("Total", receipt.total, &mut warnings);

    if receipt.items.is_empty() {
        issues.push("No items found in receipt".to_string());
    }

    if total.is_none() {
        warnings.push("No total found".to_string());
    }

    if let (Some(subtotal), Some(tax), Some(total)) = (subtotal, tax, total) {
        let calculated = subtotal + tax + tip;
        let difference = (calculated - total).abs();
        if difference.cents() > RECEIPT_TOLERANCE_CENTS {
            issues.push(format!(
                "Math doesn't add up: {} + {} + {} = {}, but total is {} (difference: {})",
                subtotal, tax, tip, calculated, total, difference
            ));
        }
    }

    if let Some(subtotal) = subtotal {
        if !receipt.items.is_empty() {
            match receipt.items_sum() {
                Some(items_sum) => {
                    if (items_sum - subtotal).abs().cents() > RECEIPT_TOLERANCE_CENTS {
                        warnings.push(format!(
                            "Items sum ({}) doesn't match subtotal ({}). Some items may be missing or incorrect.",
                            items_sum, subtotal
                        ));
                    }
                }
                None => warnings.push("Items sum is out of range and was ignored".to_string()),
            }
        }
    }

    ReceiptValidation {
        is_valid: issues.is_empty(),
        issues,
        warnings,
    }
}

/// Converts a reported amount to cents. Values cents cannot hold are
/// treated as missing and noted in `warnings`.
fn amount(label: &str, value: Option<f64>, warnings: &mut Vec<String>) -> Option<Money> {
    let value = value?;
    let money = Money::from_decimal(value);
    if money.is_none() {
        warn!(field = label, value, "Receipt amount out of range");
        warnings.push(format!("{} is out of range and was ignored", label));
    }
    money
}

// =============================================================================
// Receipt View
// =============================================================================

/// What the API returns for a scanned receipt: amounts in cents, items as
/// ready-to-add drafts, plus the validation block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub restaurant_name: Option<String>,
    pub items: Vec<BillItemCreate>,
    pub subtotal_cents: Option<i64>,
    pub tax_cents: Option<i64>,
    pub tip_cents: Option<i64>,
    pub total_cents: Option<i64>,
    pub confidence: Option<Confidence>,
    pub validation: ReceiptValidation,
}

impl Receipt {
    /// Validates `parsed` and builds the view.
    pub fn from_parsed(id: impl Into<String>, parsed: &ParsedReceipt) -> Self {
        let cents = |v: Option<f64>| v.and_then(Money::from_decimal).map(|m| m.cents());

        Receipt {
            id: id.into(),
            restaurant_name: parsed.restaurant_name.clone(),
            items: parsed.to_item_drafts(),
            subtotal_cents: cents(parsed.subtotal),
            tax_cents: cents(parsed.tax),
            tip_cents: cents(parsed.tip),
            total_cents: cents(parsed.total),
            confidence: parsed.confidence,
            validation: validate_receipt(parsed),
        }
    }
}

/// Reply to an image upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptUpload {
    pub receipt_id: String,
    pub image_url: String,
}

// =============================================================================
// Image Format
// =============================================================================

/// Image formats the vision model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Sniffs the format from magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<ImageFormat> {
        if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"\x89PNG") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"RIFF") && bytes.len() >= 12 && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }

    /// Like [`ImageFormat::detect`], falling back to JPEG with a warning.
    pub fn detect_or_jpeg(bytes: &[u8]) -> ImageFormat {
        Self::detect(bytes).unwrap_or_else(|| {
            warn!(len = bytes.len(), "Unknown image format, defaulting to JPEG");
            ImageFormat::Jpeg
        })
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
