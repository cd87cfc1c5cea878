//! # Assignment Repository
//!
//! Who shares which item, and for how much.
//!
//! ## assign_item Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  assign_item { item_id, participant_ids, split_equally }                │
//! │       │                                                                 │
//! │       ├── participant_ids empty? ──► InvalidRequest (nothing written)   │
//! │       │                                                                 │
//! │       ├── owner_of(Item, item_id) ──► NotFound                          │
//! │       │                                                                 │
//! │       ▼  session mutex held from here on                                │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │ 1. every participant id belongs to this session? else NotFound   │ │
//! │  │ 2. split_item(line_total, ids, split_equally)                    │ │
//! │  │ 3. push one ItemAssignment per share, index each id              │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! │                                                                         │
//! │  All-or-nothing: a failure in step 1 or 2 leaves the session as it was.│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tabsplit_core::split::split_item;
use tabsplit_core::{
    AssignItemRequest, AssignmentCreate, AssignmentUpdate, CoreError, ItemAssignment, Money,
    Session,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{EntityKind, StoreState};

/// Repository for item assignments.
#[derive(Debug, Clone)]
pub struct AssignmentRepository {
    state: Arc<StoreState>,
}

impl AssignmentRepository {
    pub(crate) fn new(state: Arc<StoreState>) -> Self {
        AssignmentRepository { state }
    }

    /// Records a single assignment exactly as given.
    ///
    /// The item decides the owning session; the participant must belong to
    /// the same session.
    pub fn add(&self, data: AssignmentCreate) -> StoreResult<ItemAssignment> {
        data.validate()?;

        let item_id = data.item_id.clone();
        let state = &self.state;
        state.with_owner_mut(EntityKind::Item, &item_id, |session| {
            ensure_item(session, &data.item_id)?;
            ensure_participant(session, &data.participant_id)?;

            let assignment = ItemAssignment {
                id: Uuid::new_v4().to_string(),
                item_id: data.item_id,
                participant_id: data.participant_id,
                split_percentage: data.split_percentage,
                amount_cents: data.amount_cents,
            };
            session.assignments.push(assignment.clone());
            state.index(EntityKind::Assignment, &assignment.id, &session.id);

            debug!(assignment_id = %assignment.id, "Assignment added");
            Ok(assignment)
        })
    }

    /// Splits an item among participants and records one assignment each.
    ///
    /// Existing assignments for the item are kept; this appends.
    pub fn assign_item(&self, request: AssignItemRequest) -> StoreResult<Vec<ItemAssignment>> {
        if request.participant_ids.is_empty() {
            return Err(CoreError::EmptySplit.into());
        }

        let state = &self.state;
        state.with_owner_mut(EntityKind::Item, &request.item_id, |session| {
            let line_total = ensure_item(session, &request.item_id)?;
            for participant_id in &request.participant_ids {
                ensure_participant(session, participant_id)?;
            }

            let shares = split_item(line_total, &request.participant_ids, request.split_equally)?;

            let created: Vec<ItemAssignment> = shares
                .into_iter()
                .map(|share| ItemAssignment {
                    id: Uuid::new_v4().to_string(),
                    item_id: request.item_id.clone(),
                    participant_id: share.participant_id,
                    split_percentage: share.split_percentage,
                    amount_cents: share.amount.cents(),
                })
                .collect();

            for assignment in &created {
                state.index(EntityKind::Assignment, &assignment.id, &session.id);
            }
            session.assignments.extend(created.iter().cloned());

            info!(
                session_id = %session.id,
                item_id = %request.item_id,
                participants = created.len(),
                split_equally = request.split_equally,
                "Item assigned"
            );
            Ok(created)
        })
    }

    /// Applies a partial update (caller-driven overrides of the split).
    pub fn update(&self, assignment_id: &str, update: AssignmentUpdate) -> StoreResult<ItemAssignment> {
        update.validate()?;

        self.state
            .with_owner_mut(EntityKind::Assignment, assignment_id, |session| {
                let assignment = session
                    .assignments
                    .iter_mut()
                    .find(|a| a.id == assignment_id)
                    .ok_or_else(|| StoreError::not_found("Assignment", assignment_id))?;
                update.apply_to(assignment);
                debug!(assignment_id = %assignment_id, "Assignment updated");
                Ok(assignment.clone())
            })
    }

    /// Deletes one assignment. Returns `false` when it does not exist.
    pub fn delete(&self, assignment_id: &str) -> bool {
        let state = &self.state;
        state
            .with_owner_mut(EntityKind::Assignment, assignment_id, |session| {
                let pos = session
                    .assignments
                    .iter()
                    .position(|a| a.id == assignment_id)
                    .ok_or_else(|| StoreError::not_found("Assignment", assignment_id))?;
                session.assignments.remove(pos);
                state.unindex(EntityKind::Assignment, [assignment_id]);
                debug!(assignment_id = %assignment_id, "Assignment deleted");
                Ok(())
            })
            .is_ok()
    }
}

/// Returns the item's line total, or NotFound.
fn ensure_item(session: &Session, item_id: &str) -> StoreResult<Money> {
    session
        .item(item_id)
        .map(|item| item.line_total())
        .ok_or_else(|| StoreError::not_found("Item", item_id))
}

fn ensure_participant(session: &Session, participant_id: &str) -> StoreResult<()> {
    session
        .participant(participant_id)
        .map(|_| ())
        .ok_or_else(|| StoreError::not_found("Participant", participant_id))
}

// =============================================================================
// Unit Tests
// =============================================================================
