//! # Domain Types
//!
//! Core domain entities used throughout Tab Split.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │                      ┌─────────────────────┐                           │
//! │                      │      Session        │                           │
//! │                      │  ─────────────────  │                           │
//! │                      │  id (UUID)          │                           │
//! │                      │  session_code (6ch) │                           │
//! │                      │  status             │                           │
//! │                      │  updated_at         │                           │
//! │                      └──────────┬──────────┘                           │
//! │                 owns            │           owns                        │
//! │       ┌─────────────────────────┼─────────────────────────┐            │
//! │       ▼                         ▼                         ▼            │
//! │  ┌──────────────┐      ┌─────────────────┐      ┌─────────────────┐    │
//! │  │ Participant  │      │    BillItem     │      │ ItemAssignment  │    │
//! │  │ ──────────── │      │  ─────────────  │      │  ─────────────  │    │
//! │  │ guest_name   │◄─────┼─────────────────┼──────│ participant_id  │    │
//! │  │ amount_paid  │      │ price_cents     │◄─────│ item_id         │    │
//! │  │ payment_stat │      │ quantity        │      │ split_percentage│    │
//! │  └──────────────┘      └─────────────────┘      │ amount_cents    │    │
//! │                                                  └─────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A session has:
//! - `id`: UUID v4 - immutable, used by every owned entity
//! - `session_code`: 6 characters - human-shareable, used to join

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Session Status
// =============================================================================

/// The lifecycle status of a bill-splitting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Diners are still joining and assigning items.
    #[default]
    Active,
    /// Everyone has settled up.
    Completed,
    /// The session was abandoned.
    Cancelled,
}

// =============================================================================
// Payment Status
// =============================================================================

/// Where a participant is in paying their share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Settled,
}

// =============================================================================
// Participant
// =============================================================================

/// A diner taking part in a session.
///
/// Either `user_id` or `guest_name` identifies the person; both may be empty
/// when someone joins by code without giving a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning session.
    pub session_id: String,

    /// Registered user, if any.
    pub user_id: Option<String>,

    /// Display name for guests.
    pub guest_name: Option<String>,

    /// What this participant owes, in cents (caller-maintained).
    pub amount_owed_cents: i64,

    /// What this participant has paid so far, in cents.
    pub amount_paid_cents: i64,

    pub payment_status: PaymentStatus,

    #[ts(as = "String")]
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    /// Name to show in summaries: guest name, then user id, then "Guest".
    pub fn display_name(&self) -> &str {
        self.guest_name
            .as_deref()
            .or(self.user_id.as_deref())
            .unwrap_or("Guest")
    }
}

// =============================================================================
// Bill Item
// =============================================================================

/// One line item on the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    pub id: String,
    pub session_id: String,
    pub name: String,
    /// Unit price in cents.
    pub price_cents: i64,
    pub quantity: i64,
    pub category: Option<String>,
    /// 1-based position on the source receipt.
    pub line_number: i64,
}

impl BillItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Item Assignment
// =============================================================================

/// A record that a participant owes a share of an item.
///
/// References both the item and the participant without owning either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemAssignment {
    pub id: String,
    pub item_id: String,
    pub participant_id: String,
    /// Share of the item in [0, 1] (0.5 = half).
    pub split_percentage: f64,
    /// The share owed, in cents.
    pub amount_cents: i64,
}

impl ItemAssignment {
    /// Returns the share owed as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Session
// =============================================================================

/// One bill-splitting event and everything it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub session_code: String,
    pub restaurant_name: Option<String>,
    pub receipt_image_url: Option<String>,
    pub created_by: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub tip_cents: i64,
    pub total_cents: i64,
    pub status: SessionStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub items: Vec<BillItem>,
    pub participants: Vec<Participant>,
    pub assignments: Vec<ItemAssignment>,
}

impl Session {
    /// Advances `updated_at` after a mutation.
    ///
    /// ## Monotonic Guarantee
    /// Wall clocks can stand still (coarse resolution) or step backwards
    /// (NTP). `updated_at` must strictly increase on every mutation, so when
    /// `now` is not ahead of the stored value we advance it by one
    /// microsecond instead.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    pub fn item(&self, item_id: &str) -> Option<&BillItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    pub fn assignment(&self, assignment_id: &str) -> Option<&ItemAssignment> {
        self.assignments.iter().find(|a| a.id == assignment_id)
    }

    /// Position the next manually added item gets when none is given.
    pub fn next_line_number(&self) -> i64 {
        self.items.iter().map(|i| i.line_number).max().unwrap_or(0) + 1
    }

    /// Sum of every item's line total.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(BillItem::line_total).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
