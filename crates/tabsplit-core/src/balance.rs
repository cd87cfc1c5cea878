//! # Balances
//!
//! Who owes what, derived from a session's assignments.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  assigned     = Σ assignment.amount for the participant                 │
//! │  outstanding  = max(assigned − amount_paid, 0)                          │
//! │                                                                         │
//! │  unassigned   = max(items total − Σ all assignment amounts, 0)          │
//! │                 (what nobody has claimed yet)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Assignments that point at an item no longer on the bill are skipped.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentStatus, Session};

/// One participant's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantBalance {
    pub participant_id: String,
    pub display_name: String,
    pub assigned_cents: i64,
    pub amount_paid_cents: i64,
    pub outstanding_cents: i64,
    pub payment_status: PaymentStatus,
}

/// Balances for a whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionBalances {
    pub session_id: String,
    pub items_total_cents: i64,
    pub assigned_total_cents: i64,
    pub unassigned_cents: i64,
    pub participants: Vec<ParticipantBalance>,
}

/// Computes balances in participant join order.
pub fn compute_balances(session: &Session) -> SessionBalances {
    let live = session
        .assignments
        .iter()
        .filter(|a| session.item(&a.item_id).is_some());

    let assigned_total: Money = live.clone().map(|a| a.amount()).sum();
    let items_total = session.items_total();

    let participants = session
        .participants
        .iter()
        .map(|p| {
            let assigned: Money = live
                .clone()
                .filter(|a| a.participant_id == p.id)
                .map(|a| a.amount())
                .sum();
            let outstanding = (assigned - p.amount_paid()).cents().max(0);

            ParticipantBalance {
                participant_id: p.id.clone(),
                display_name: p.display_name().to_string(),
                assigned_cents: assigned.cents(),
                amount_paid_cents: p.amount_paid_cents,
                outstanding_cents: outstanding,
                payment_status: p.payment_status,
            }
        })
        .collect();

    SessionBalances {
        session_id: session.id.clone(),
        items_total_cents: items_total.cents(),
        assigned_total_cents: assigned_total.cents(),
        unassigned_cents: (items_total - assigned_total).cents().max(0),
        participants,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
