//! # Participant Repository
//!
//! Adding diners to a session and tracking what they have paid.

use std::sync::Arc;

use chrono::Utc;
use tabsplit_core::validation::non_blank;
use tabsplit_core::{Participant, ParticipantCreate, ParticipantUpdate, PaymentStatus};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{EntityKind, StoreState};

/// Builds a participant record from a validated payload.
pub(crate) fn build_participant(session_id: &str, data: ParticipantCreate) -> Participant {
    Participant {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        user_id: non_blank(data.user_id),
        guest_name: non_blank(data.guest_name),
        amount_owed_cents: data.amount_owed_cents,
        amount_paid_cents: data.amount_paid_cents,
        payment_status: data.payment_status,
        joined_at: Utc::now(),
    }
}

/// Repository for participants.
#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    state: Arc<StoreState>,
}

impl ParticipantRepository {
    pub(crate) fn new(state: Arc<StoreState>) -> Self {
        ParticipantRepository { state }
    }

    /// Adds a participant to a session.
    pub fn add(&self, session_id: &str, data: ParticipantCreate) -> StoreResult<Participant> {
        data.validate()?;

        let state = &self.state;
        state.with_session_mut(session_id, |session| {
            let participant = build_participant(&session.id, data);
            session.participants.push(participant.clone());
            state.index(EntityKind::Participant, &participant.id, &session.id);

            debug!(session_id = %session.id, participant_id = %participant.id, "Participant added");
            Ok(participant)
        })
    }

    /// Lists a session's participants in join order.
    pub fn list(&self, session_id: &str) -> StoreResult<Vec<Participant>> {
        self.state
            .with_session(session_id, |session| session.participants.clone())
    }

    /// Applies a partial update.
    pub fn update(&self, participant_id: &str, update: ParticipantUpdate) -> StoreResult<Participant> {
        update.validate()?;

        self.state
            .with_owner_mut(EntityKind::Participant, participant_id, |session| {
                let participant = find_mut(&mut session.participants, participant_id)?;
                update.apply_to(participant);
                debug!(participant_id = %participant_id, "Participant updated");
                Ok(participant.clone())
            })
    }

    /// Sets the payment status to paid.
    pub fn mark_paid(&self, participant_id: &str) -> StoreResult<Participant> {
        self.update(
            participant_id,
            ParticipantUpdate {
                payment_status: Some(PaymentStatus::Paid),
                ..Default::default()
            },
        )
    }
}

fn find_mut<'a>(participants: &'a mut [Participant], id: &str) -> StoreResult<&'a mut Participant> {
    participants
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| StoreError::not_found("Participant", id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::store::Store;
    use crate::StoreError;
    use tabsplit_core::{ParticipantCreate, ParticipantUpdate, PaymentStatus, SessionCreate};

    #[test]
    fn test_add_and_list() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();

        store
            .participants()
            .add(&session.id, ParticipantCreate::guest("Ana"))
            .unwrap();
        store
            .participants()
            .add(
                &session.id,
                ParticipantCreate {
                    user_id: Some("user-7".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let list = store.participants().list(&session.id).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].display_name(), "Ana");
        assert_eq!(list[1].user_id.as_deref(), Some("user-7"));
        assert_eq!(list[1].payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_add_to_missing_session() {
        let store = Store::new();
        let result = store
            .participants()
            .add("missing", ParticipantCreate::guest("Ana"));
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_update_through_index() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();
        let p = store
            .participants()
            .add(&session.id, ParticipantCreate::guest("Ana"))
            .unwrap();

        let updated = store
            .participants()
            .update(
                &p.id,
                ParticipantUpdate {
                    amount_paid_cents: Some(1500),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.amount_paid_cents, 1500);
        assert_eq!(updated.guest_name.as_deref(), Some("Ana"));
        assert_eq!(
            store.sessions().get(&session.id).unwrap().participants[0].amount_paid_cents,
            1500
        );
    }

    #[test]
    fn test_update_rejects_negative_amounts() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();
        let p = store
            .participants()
            .add(&session.id, ParticipantCreate::guest("Ana"))
            .unwrap();

        let result = store.participants().update(
            &p.id,
            ParticipantUpdate {
                amount_owed_cents: Some(-1),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_mark_paid() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();
        let p = store
            .participants()
            .add(&session.id, ParticipantCreate::guest("Ana"))
            .unwrap();

        let paid = store.participants().mark_paid(&p.id).unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);

        let missing = store.participants().mark_paid("nope");
        assert!(matches!(missing, Err(StoreError::NotFound { ref entity, .. }) if entity == "Participant"));
    }
}
