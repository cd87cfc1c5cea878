//! # Payloads
//!
//! Request bodies accepted by the store and the HTTP layer.
//!
//! ## Create vs Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  *Create payloads                                                       │
//! │    Every optional field falls back to its documented default.           │
//! │                                                                         │
//! │  *Update payloads                                                       │
//! │    Every field is optional. Only fields that are PRESENT are applied;   │
//! │    absent fields leave the record untouched. Unknown fields are         │
//! │    rejected, so a typo never silently becomes a no-op.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each payload knows how to validate itself; the store calls `validate()`
//! before it writes anything.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{
    BillItem, ItemAssignment, Participant, PaymentStatus, Session, SessionStatus,
};
use crate::validation::{
    non_blank, validate_amount_cents, validate_line_number, validate_name,
    validate_optional_name, validate_quantity, validate_split_percentage,
};

// =============================================================================
// Session
// =============================================================================

/// Body of "create session".
///
/// `items` lets a client create a session straight from a scanned receipt in
/// one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionCreate {
    pub restaurant_name: Option<String>,
    pub receipt_image_url: Option<String>,
    pub created_by: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub tip_cents: i64,
    pub total_cents: i64,
    pub items: Vec<BillItemCreate>,
}

impl SessionCreate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_name("restaurantName", self.restaurant_name.as_deref())?;
        validate_amount_cents("subtotalCents", self.subtotal_cents)?;
        validate_amount_cents("taxCents", self.tax_cents)?;
        validate_amount_cents("tipCents", self.tip_cents)?;
        validate_amount_cents("totalCents", self.total_cents)?;
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

/// Partial update of a session's own fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionUpdate {
    pub restaurant_name: Option<String>,
    pub receipt_image_url: Option<String>,
    pub subtotal_cents: Option<i64>,
    pub tax_cents: Option<i64>,
    pub tip_cents: Option<i64>,
    pub total_cents: Option<i64>,
    pub status: Option<SessionStatus>,
}

impl SessionUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_name("restaurantName", self.restaurant_name.as_deref())?;
        for (field, value) in [
            ("subtotalCents", self.subtotal_cents),
            ("taxCents", self.tax_cents),
            ("tipCents", self.tip_cents),
            ("totalCents", self.total_cents),
        ] {
            if let Some(cents) = value {
                validate_amount_cents(field, cents)?;
            }
        }
        Ok(())
    }

    /// Copies the present fields onto `session`. Does not touch `updated_at`.
    pub fn apply_to(self, session: &mut Session) {
        if let Some(name) = self.restaurant_name {
            session.restaurant_name = non_blank(Some(name));
        }
        if let Some(url) = self.receipt_image_url {
            session.receipt_image_url = non_blank(Some(url));
        }
        if let Some(cents) = self.subtotal_cents {
            session.subtotal_cents = cents;
        }
        if let Some(cents) = self.tax_cents {
            session.tax_cents = cents;
        }
        if let Some(cents) = self.tip_cents {
            session.tip_cents = cents;
        }
        if let Some(cents) = self.total_cents {
            session.total_cents = cents;
        }
        if let Some(status) = self.status {
            session.status = status;
        }
    }
}

// =============================================================================
// Participant
// =============================================================================

/// Body of "add participant".
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantCreate {
    pub user_id: Option<String>,
    pub guest_name: Option<String>,
    pub amount_owed_cents: i64,
    pub amount_paid_cents: i64,
    pub payment_status: PaymentStatus,
}

impl ParticipantCreate {
    /// A guest identified only by name.
    pub fn guest(name: impl Into<String>) -> Self {
        ParticipantCreate {
            guest_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_name("guestName", self.guest_name.as_deref())?;
        validate_amount_cents("amountOwedCents", self.amount_owed_cents)?;
        validate_amount_cents("amountPaidCents", self.amount_paid_cents)?;
        Ok(())
    }
}

/// Partial update of a participant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParticipantUpdate {
    pub user_id: Option<String>,
    pub guest_name: Option<String>,
    pub amount_owed_cents: Option<i64>,
    pub amount_paid_cents: Option<i64>,
    pub payment_status: Option<PaymentStatus>,
}

impl ParticipantUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_name("guestName", self.guest_name.as_deref())?;
        if let Some(cents) = self.amount_owed_cents {
            validate_amount_cents("amountOwedCents", cents)?;
        }
        if let Some(cents) = self.amount_paid_cents {
            validate_amount_cents("amountPaidCents", cents)?;
        }
        Ok(())
    }

    pub fn apply_to(self, participant: &mut Participant) {
        if let Some(user_id) = self.user_id {
            participant.user_id = non_blank(Some(user_id));
        }
        if let Some(name) = self.guest_name {
            participant.guest_name = non_blank(Some(name));
        }
        if let Some(cents) = self.amount_owed_cents {
            participant.amount_owed_cents = cents;
        }
        if let Some(cents) = self.amount_paid_cents {
            participant.amount_paid_cents = cents;
        }
        if let Some(status) = self.payment_status {
            participant.payment_status = status;
        }
    }
}

// =============================================================================
// Bill Item
// =============================================================================

fn default_quantity() -> i64 {
    1
}

/// Body of "add item". Also the shape of a scanned receipt line.
///
/// `line_number` is optional for manual entry; the store puts the item at
/// the end of the bill when it is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillItemCreate {
    pub name: String,
    pub price_cents: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub line_number: Option<i64>,
}

impl BillItemCreate {
    pub fn new(name: impl Into<String>, price_cents: i64) -> Self {
        BillItemCreate {
            name: name.into(),
            price_cents,
            quantity: 1,
            category: None,
            line_number: None,
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)?;
        validate_amount_cents("priceCents", self.price_cents)?;
        validate_quantity(self.quantity)?;
        if let Some(line) = self.line_number {
            validate_line_number(line)?;
        }
        Ok(())
    }
}

/// Partial update of an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BillItemUpdate {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub category: Option<String>,
    pub line_number: Option<i64>,
}

impl BillItemUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(cents) = self.price_cents {
            validate_amount_cents("priceCents", cents)?;
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(line) = self.line_number {
            validate_line_number(line)?;
        }
        Ok(())
    }

    pub fn apply_to(self, item: &mut BillItem) {
        if let Some(name) = self.name {
            item.name = name.trim().to_string();
        }
        if let Some(cents) = self.price_cents {
            item.price_cents = cents;
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(category) = self.category {
            item.category = non_blank(Some(category));
        }
        if let Some(line) = self.line_number {
            item.line_number = line;
        }
    }
}

// =============================================================================
// Assignment
// =============================================================================

/// Body of "create assignment" (a single raw record).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentCreate {
    pub item_id: String,
    pub participant_id: String,
    pub split_percentage: f64,
    pub amount_cents: i64,
}

impl AssignmentCreate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_split_percentage(self.split_percentage)?;
        validate_amount_cents("amountCents", self.amount_cents)?;
        Ok(())
    }
}

/// Partial update of an assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssignmentUpdate {
    pub split_percentage: Option<f64>,
    pub amount_cents: Option<i64>,
}

impl AssignmentUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(pct) = self.split_percentage {
            validate_split_percentage(pct)?;
        }
        if let Some(cents) = self.amount_cents {
            validate_amount_cents("amountCents", cents)?;
        }
        Ok(())
    }

    pub fn apply_to(self, assignment: &mut ItemAssignment) {
        if let Some(pct) = self.split_percentage {
            assignment.split_percentage = pct;
        }
        if let Some(cents) = self.amount_cents {
            assignment.amount_cents = cents;
        }
    }
}

fn default_split_equally() -> bool {
    true
}

/// Body of "assign item": split one item among several participants.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AssignItemRequest {
    pub item_id: String,
    pub participant_ids: Vec<String>,
    #[serde(default = "default_split_equally")]
    pub split_equally: bool,
}

// =============================================================================
// Join
// =============================================================================

/// Body of "join session by code".
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinSessionRequest {
    pub session_code: String,
    pub guest_name: Option<String>,
    pub user_id: Option<String>,
}

/// Reply to a successful join: the whole session plus the new participant.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionResponse {
    pub session: Session,
    pub participant: Participant,
}

// =============================================================================
// Unit Tests
// =============================================================================
