//! # Item Repository
//!
//! Bill items: add, list, update, delete.
//!
//! ## Delete Cascade
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete item "Nachos"                                                   │
//! │       │                                                                 │
//! │       ├── remove the item                                               │
//! │       ├── remove every assignment whose item_id == "Nachos"             │
//! │       └── drop all of those ids from the owner index                    │
//! │                                                                         │
//! │  Assignments never point at an item that no longer exists.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tabsplit_core::validation::non_blank;
use tabsplit_core::{BillItem, BillItemCreate, BillItemUpdate};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{EntityKind, StoreState};

/// Builds an item record from a validated payload. `fallback_line` is used
/// when the payload has no line number.
pub(crate) fn build_item(session_id: &str, data: BillItemCreate, fallback_line: i64) -> BillItem {
    BillItem {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        name: data.name.trim().to_string(),
        price_cents: data.price_cents,
        quantity: data.quantity,
        category: non_blank(data.category),
        line_number: data.line_number.unwrap_or(fallback_line),
    }
}

/// Repository for bill items.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    state: Arc<StoreState>,
}

impl ItemRepository {
    pub(crate) fn new(state: Arc<StoreState>) -> Self {
        ItemRepository { state }
    }

    /// Adds an item to a session. Without a line number it goes last.
    pub fn add(&self, session_id: &str, data: BillItemCreate) -> StoreResult<BillItem> {
        data.validate()?;

        let state = &self.state;
        state.with_session_mut(session_id, |session| {
            let item = build_item(&session.id, data, session.next_line_number());
            session.items.push(item.clone());
            state.index(EntityKind::Item, &item.id, &session.id);

            debug!(
                session_id = %session.id,
                item_id = %item.id,
                line_total = %item.line_total(),
                "Item added"
            );
            Ok(item)
        })
    }

    /// Lists a session's items in insertion order.
    pub fn list(&self, session_id: &str) -> StoreResult<Vec<BillItem>> {
        self.state
            .with_session(session_id, |session| session.items.clone())
    }

    /// Applies a partial update. Existing assignments keep their amounts.
    pub fn update(&self, item_id: &str, update: BillItemUpdate) -> StoreResult<BillItem> {
        update.validate()?;

        self.state.with_owner_mut(EntityKind::Item, item_id, |session| {
            let item = session
                .items
                .iter_mut()
                .find(|i| i.id == item_id)
                .ok_or_else(|| StoreError::not_found("Item", item_id))?;
            update.apply_to(item);
            debug!(item_id = %item_id, "Item updated");
            Ok(item.clone())
        })
    }

    /// Deletes an item and the assignments that reference it.
    ///
    /// Returns `false` when the item does not exist.
    pub fn delete(&self, item_id: &str) -> bool {
        let state = &self.state;
        let result = state.with_owner_mut(EntityKind::Item, item_id, |session| {
            let pos = session
                .items
                .iter()
                .position(|i| i.id == item_id)
                .ok_or_else(|| StoreError::not_found("Item", item_id))?;
            session.items.remove(pos);

            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut session.assignments)
                .into_iter()
                .partition(|a| a.item_id == item_id);
            session.assignments = kept;

            state.unindex(EntityKind::Item, [item_id]);
            state.unindex(EntityKind::Assignment, removed.iter().map(|a| a.id.as_str()));
            Ok(removed.len())
        });

        match result {
            Ok(cascaded) => {
                debug!(item_id = %item_id, cascaded, "Item deleted");
                true
            }
            Err(_) => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
