//! # Session Repository
//!
//! Session lifecycle: create, look up, update, complete, delete, join.
//!
//! ## Join Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Diner types "k7q2zd"                                                   │
//! │       │                                                                 │
//! │       ▼  (API upper-cases → "K7Q2ZD")                                   │
//! │  codes["K7Q2ZD"] ──► session id                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  session mutex                                                          │
//! │  ├── push Participant                                                   │
//! │  ├── index participant id → session id                                  │
//! │  └── updated_at bumped                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { session (with the new participant), participant }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delete Cascade
//! Deleting a session drops its code (immediately reusable) and every
//! participant, item and assignment id from the owner index.

use std::sync::Arc;

use chrono::Utc;
use tabsplit_core::balance::{compute_balances, SessionBalances};
use tabsplit_core::validation::non_blank;
use tabsplit_core::{
    JoinSessionRequest, JoinSessionResponse, ParticipantCreate, Session, SessionCreate,
    SessionStatus, SessionUpdate,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::repository::item::build_item;
use crate::repository::participant::build_participant;
use crate::store::{lock, EntityKind, StoreState};

/// Repository for sessions.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    state: Arc<StoreState>,
}

impl SessionRepository {
    pub(crate) fn new(state: Arc<StoreState>) -> Self {
        SessionRepository { state }
    }

    /// Creates a session with a fresh id and a unique code.
    ///
    /// Initial `items` (e.g. from a scanned receipt) are numbered by
    /// position unless they carry their own line numbers.
    pub fn create(&self, data: SessionCreate) -> StoreResult<Session> {
        data.validate()?;

        let SessionCreate {
            restaurant_name,
            receipt_image_url,
            created_by,
            subtotal_cents,
            tax_cents,
            tip_cents,
            total_cents,
            items,
        } = data;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let items = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| build_item(&id, item, idx as i64 + 1))
            .collect();

        let session = self.state.insert_session(|session_code| Session {
            id,
            session_code,
            restaurant_name: non_blank(restaurant_name),
            receipt_image_url: non_blank(receipt_image_url),
            created_by,
            subtotal_cents,
            tax_cents,
            tip_cents,
            total_cents,
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
            items,
            participants: Vec::new(),
            assignments: Vec::new(),
        });

        info!(
            session_id = %session.id,
            code = %session.session_code,
            items = session.items.len(),
            "Session created"
        );
        Ok(session)
    }

    /// Gets a session by id.
    pub fn get(&self, session_id: &str) -> StoreResult<Session> {
        self.state.with_session(session_id, Session::clone)
    }

    /// Gets a session by its code. The match is exact; callers normalize.
    pub fn get_by_code(&self, code: &str) -> StoreResult<Session> {
        let session_id = self
            .state
            .session_id_for_code(code)
            .ok_or_else(|| StoreError::not_found("Session with code", code))?;

        self.get(&session_id)
            .map_err(|_| StoreError::not_found("Session with code", code))
    }

    /// Applies a partial update.
    pub fn update(&self, session_id: &str, update: SessionUpdate) -> StoreResult<Session> {
        update.validate()?;

        self.state.with_session_mut(session_id, |session| {
            update.apply_to(session);
            debug!(session_id = %session.id, "Session updated");
            Ok(session.clone())
        })
    }

    /// Marks the session completed.
    pub fn complete(&self, session_id: &str) -> StoreResult<Session> {
        self.state.with_session_mut(session_id, |session| {
            session.status = SessionStatus::Completed;
            info!(session_id = %session.id, "Session completed");
            Ok(session.clone())
        })
    }

    /// Deletes a session and everything it owns.
    ///
    /// Returns `false` when no live session has this id.
    pub fn delete(&self, session_id: &str) -> bool {
        let Some(handle) = self.state.handle(session_id) else {
            return false;
        };

        let mut record = lock(&handle);
        if record.deleted {
            return false;
        }
        record.deleted = true;

        let session = &record.session;
        self.state.unindex(
            EntityKind::Participant,
            session.participants.iter().map(|p| p.id.as_str()),
        );
        self.state
            .unindex(EntityKind::Item, session.items.iter().map(|i| i.id.as_str()));
        self.state.unindex(
            EntityKind::Assignment,
            session.assignments.iter().map(|a| a.id.as_str()),
        );
        self.state.remove_session(&session.id, &session.session_code);

        info!(session_id = %session.id, code = %session.session_code, "Session deleted");
        true
    }

    /// Joins a session by code, creating a participant for the caller.
    pub fn join(&self, request: JoinSessionRequest) -> StoreResult<JoinSessionResponse> {
        let JoinSessionRequest {
            session_code,
            guest_name,
            user_id,
        } = request;

        let data = ParticipantCreate {
            user_id,
            guest_name,
            ..Default::default()
        };
        data.validate()?;

        let session_id = self
            .state
            .session_id_for_code(&session_code)
            .ok_or_else(|| StoreError::not_found("Session with code", &session_code))?;

        let state = &self.state;
        state.with_session_mut(&session_id, |session| {
            let participant = build_participant(&session.id, data);
            session.participants.push(participant.clone());
            state.index(EntityKind::Participant, &participant.id, &session.id);

            info!(
                session_id = %session.id,
                participant_id = %participant.id,
                "Participant joined by code"
            );
            Ok(JoinSessionResponse {
                session: session.clone(),
                participant,
            })
        })
    }

    /// Computes who owes what.
    pub fn balances(&self, session_id: &str) -> StoreResult<SessionBalances> {
        self.state.with_session(session_id, compute_balances)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::store::Store;
    use crate::StoreError;
    use std::collections::HashSet;
    use tabsplit_core::code::is_valid_code;
    use tabsplit_core::{
        AssignItemRequest, AssignmentCreate, AssignmentUpdate, BillItemCreate, BillItemUpdate,
        JoinSessionRequest, ParticipantCreate, ParticipantUpdate, SessionCreate, SessionStatus,
        SessionUpdate,
    };

    #[test]
    fn test_create_assigns_unique_codes() {
        let store = Store::new();
        let mut codes = HashSet::new();

        for _ in 0..200 {
            let session = store.sessions().create(SessionCreate::default()).unwrap();
            assert!(is_valid_code(&session.session_code));
            assert_eq!(session.status, SessionStatus::Active);
            assert_eq!(session.created_at, session.updated_at);
            assert!(codes.insert(session.session_code));
        }
    }

    #[test]
    fn test_get_by_code_round_trip() {
        let store = Store::new();
        let session = store
            .sessions()
            .create(SessionCreate {
                restaurant_name: Some("Luigi's".to_string()),
                ..Default::default()
            })
            .unwrap();

        let found = store.sessions().get_by_code(&session.session_code).unwrap();
        assert_eq!(found.id, session.id);
        assert_eq!(found.restaurant_name.as_deref(), Some("Luigi's"));

        let lower = session.session_code.to_lowercase();
        assert!(store.sessions().get_by_code(&lower).is_err());
    }

    #[test]
    fn test_create_with_initial_items() {
        let store = Store::new();
        let session = store
            .sessions()
            .create(SessionCreate {
                items: vec![
                    BillItemCreate::new("Pizza", 1800),
                    BillItemCreate::new("Salad", 900).with_quantity(2),
                ],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(session.items.len(), 2);
        assert_eq!(session.items[1].line_number, 2);
        assert_eq!(session.items_total().cents(), 3600);

        // Initial items are reachable by id.
        let item_id = session.items[0].id.clone();
        assert!(store.items().delete(&item_id));
    }

    #[test]
    fn test_create_rejects_invalid_items() {
        let store = Store::new();
        let result = store.sessions().create(SessionCreate {
            items: vec![BillItemCreate::new("Pizza", -5)],
            ..Default::default()
        });
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_update_applies_fields_and_bumps_updated_at() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();

        let updated = store
            .sessions()
            .update(
                &session.id,
                SessionUpdate {
                    tax_cents: Some(250),
                    restaurant_name: Some("Noodle Bar".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.tax_cents, 250);
        assert_eq!(updated.restaurant_name.as_deref(), Some("Noodle Bar"));
        assert!(updated.updated_at > session.updated_at);
        assert_eq!(store.sessions().get(&session.id).unwrap(), updated);
    }

    #[test]
    fn test_updated_at_strictly_increases() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();
        let mut last = session.updated_at;

        let mut check = |store: &Store, step: &str| {
            let now = store.sessions().get(&session.id).unwrap().updated_at;
            assert!(now > last, "updatedAt did not advance after {}", step);
            last = now;
        };

        let p = store
            .participants()
            .add(&session.id, ParticipantCreate::guest("Ana"))
            .unwrap();
        check(&store, "participant add");

        store
            .sessions()
            .join(JoinSessionRequest {
                session_code: session.session_code.clone(),
                guest_name: Some("Ben".to_string()),
                user_id: None,
            })
            .unwrap();
        check(&store, "join");

        store
            .participants()
            .update(
                &p.id,
                ParticipantUpdate {
                    guest_name: Some("Ana B".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        check(&store, "participant update");

        let item = store
            .items()
            .add(&session.id, BillItemCreate::new("Soup", 600))
            .unwrap();
        check(&store, "item add");

        store
            .items()
            .update(
                &item.id,
                BillItemUpdate {
                    quantity: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();
        check(&store, "item update");

        store
            .assignments()
            .assign_item(AssignItemRequest {
                item_id: item.id.clone(),
                participant_ids: vec![p.id.clone()],
                split_equally: true,
            })
            .unwrap();
        check(&store, "assign item");

        let single = store
            .assignments()
            .add(AssignmentCreate {
                item_id: item.id.clone(),
                participant_id: p.id.clone(),
                split_percentage: 0.5,
                amount_cents: 300,
            })
            .unwrap();
        check(&store, "assignment add");

        store
            .assignments()
            .update(
                &single.id,
                AssignmentUpdate {
                    amount_cents: Some(250),
                    ..Default::default()
                },
            )
            .unwrap();
        check(&store, "assignment update");

        assert!(store.assignments().delete(&single.id));
        check(&store, "assignment delete");

        store.participants().mark_paid(&p.id).unwrap();
        check(&store, "mark paid");

        store
            .sessions()
            .update(
                &session.id,
                SessionUpdate {
                    tip_cents: Some(100),
                    ..Default::default()
                },
            )
            .unwrap();
        check(&store, "session update");

        assert!(store.items().delete(&item.id));
        check(&store, "item delete");

        store.sessions().complete(&session.id).unwrap();
        check(&store, "complete");
    }

    #[test]
    fn test_failed_mutation_keeps_updated_at() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();
        let item = store
            .items()
            .add(&session.id, BillItemCreate::new("Soup", 600))
            .unwrap();
        let before = store.sessions().get(&session.id).unwrap().updated_at;

        let result = store.assignments().assign_item(AssignItemRequest {
            item_id: item.id,
            participant_ids: vec!["nobody".to_string()],
            split_equally: true,
        });

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(store.sessions().get(&session.id).unwrap().updated_at, before);
    }

    #[test]
    fn test_delete_cascades_and_frees_code() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();
        let p = store
            .participants()
            .add(&session.id, ParticipantCreate::guest("Ana"))
            .unwrap();
        let item = store
            .items()
            .add(&session.id, BillItemCreate::new("Tacos", 1200))
            .unwrap();
        store
            .assignments()
            .assign_item(AssignItemRequest {
                item_id: item.id.clone(),
                participant_ids: vec![p.id.clone()],
                split_equally: true,
            })
            .unwrap();
        assert_eq!(store.state().index_len(), 3);

        assert!(store.sessions().delete(&session.id));
        assert!(!store.sessions().delete(&session.id));

        assert!(store.sessions().get(&session.id).is_err());
        assert!(store.sessions().get_by_code(&session.session_code).is_err());
        assert_eq!(store.state().index_len(), 0);
        assert!(store.participants().mark_paid(&p.id).is_err());
        assert!(!store.items().delete(&item.id));
    }

    #[test]
    fn test_join_by_code() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();

        let joined = store
            .sessions()
            .join(JoinSessionRequest {
                session_code: session.session_code.clone(),
                guest_name: Some("Ben".to_string()),
                user_id: None,
            })
            .unwrap();

        assert_eq!(joined.session.id, session.id);
        assert_eq!(joined.session.participants.len(), 1);
        assert_eq!(joined.participant.guest_name.as_deref(), Some("Ben"));
        assert_eq!(joined.participant.session_id, session.id);
    }

    #[test]
    fn test_join_without_name_is_allowed() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();

        let joined = store
            .sessions()
            .join(JoinSessionRequest {
                session_code: session.session_code,
                guest_name: Some("   ".to_string()),
                user_id: None,
            })
            .unwrap();
        assert_eq!(joined.participant.guest_name, None);
    }

    #[test]
    fn test_join_unknown_code() {
        let store = Store::new();
        let result = store.sessions().join(JoinSessionRequest {
            session_code: "ZZZZZZ".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_complete_session() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();
        let done = store.sessions().complete(&session.id).unwrap();
        assert_eq!(done.status, SessionStatus::Completed);
        assert!(store.sessions().complete("missing").is_err());
    }

    #[test]
    fn test_concurrent_creates_get_distinct_codes() {
        let store = Store::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| {
                            store
                                .sessions()
                                .create(SessionCreate::default())
                                .unwrap()
                                .session_code
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut codes = HashSet::new();
        for handle in handles {
            for code in handle.join().unwrap() {
                assert!(codes.insert(code));
            }
        }
        assert_eq!(codes.len(), 400);
    }

    #[test]
    fn test_concurrent_joins_on_one_session() {
        let store = Store::new();
        let session = store.sessions().create(SessionCreate::default()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let code = session.session_code.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        store
                            .sessions()
                            .join(JoinSessionRequest {
                                session_code: code.clone(),
                                guest_name: Some(format!("guest-{}-{}", i, j)),
                                user_id: None,
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let session = store.sessions().get(&session.id).unwrap();
        assert_eq!(session.participants.len(), 200);
        assert_eq!(store.state().index_len(), 200);
    }
}
