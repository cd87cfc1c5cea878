//! # Store
//!
//! The shared, in-memory home of every live session.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           StoreState                                    │
//! │                                                                         │
//! │  sessions: RwLock<HashMap<session id, Arc<Mutex<SessionRecord>>>>      │
//! │                                      │                                  │
//! │                                      └─► one mutex PER SESSION          │
//! │                                                                         │
//! │  codes:    RwLock<HashMap<session code, session id>>                   │
//! │  owners:   RwLock<HashMap<(kind, entity id), session id>>              │
//! │  receipts: RwLock<ReceiptShelf>  (at most N images, oldest evicted)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lock Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. session mutex                                                       │
//! │  2. sessions map  →  codes  →  owners   (index locks, in this order)    │
//! │                                                                         │
//! │  An index lock is NEVER held while waiting for a session mutex:         │
//! │  resolve the handle, clone the Arc, drop the map guard, then lock.      │
//! │                                                                         │
//! │  A deleted session keeps its mutex alive until the last Arc drops;      │
//! │  `deleted` is checked under that mutex so a writer that raced a delete  │
//! │  sees NotFound instead of resurrecting the session.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tabsplit_core::code::generate_unique_code;
use tabsplit_core::receipt::{ImageFormat, ParsedReceipt};
use tabsplit_core::Session;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::repository::assignment::AssignmentRepository;
use crate::repository::item::ItemRepository;
use crate::repository::participant::ParticipantRepository;
use crate::repository::receipt::ReceiptRepository;
use crate::repository::session::SessionRepository;

// =============================================================================
// Records
// =============================================================================

/// Kinds of entity a session owns, for the id → session index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Participant,
    Item,
    Assignment,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Participant => "Participant",
            EntityKind::Item => "Item",
            EntityKind::Assignment => "Assignment",
        }
    }
}

#[derive(Debug)]
pub(crate) struct SessionRecord {
    pub(crate) session: Session,
    pub(crate) deleted: bool,
}

pub(crate) type SessionHandle = Arc<Mutex<SessionRecord>>;

/// An uploaded receipt image and, once scanned, the model's reading of it.
#[derive(Debug, Clone)]
pub(crate) struct ReceiptRecord {
    pub(crate) image: Arc<[u8]>,
    pub(crate) format: ImageFormat,
    pub(crate) parsed: Option<ParsedReceipt>,
}

/// Default number of receipt images kept in memory.
pub const MAX_STORED_RECEIPTS: usize = 100;

/// Receipt records in upload order, bounded by `capacity`.
///
/// Uploading past the capacity evicts the oldest receipt, scanned or not.
#[derive(Debug)]
pub(crate) struct ReceiptShelf {
    records: HashMap<String, ReceiptRecord>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ReceiptShelf {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        ReceiptShelf {
            records: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Stores a record and returns the ids evicted to make room.
    pub(crate) fn insert(&mut self, receipt_id: String, record: ReceiptRecord) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.order.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.records.remove(&oldest);
                    evicted.push(oldest);
                }
                None => break,
            }
        }
        self.order.push_back(receipt_id.clone());
        self.records.insert(receipt_id, record);
        evicted
    }

    pub(crate) fn get(&self, receipt_id: &str) -> Option<&ReceiptRecord> {
        self.records.get(receipt_id)
    }

    pub(crate) fn get_mut(&mut self, receipt_id: &str) -> Option<&mut ReceiptRecord> {
        self.records.get_mut(receipt_id)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

impl Default for ReceiptShelf {
    fn default() -> Self {
        ReceiptShelf::with_capacity(MAX_STORED_RECEIPTS)
    }
}

// =============================================================================
// Lock Helpers
// =============================================================================

// A panic inside a critical section leaves plain data behind, never a
// half-applied mutation we could detect, so poisoned locks are recovered.

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Shared State
// =============================================================================

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    codes: RwLock<HashMap<String, String>>,
    owners: RwLock<HashMap<(EntityKind, String), String>>,
    pub(crate) receipts: RwLock<ReceiptShelf>,
}

impl StoreState {
    /// Resolves a session handle without locking the session.
    pub(crate) fn handle(&self, session_id: &str) -> Option<SessionHandle> {
        read(&self.sessions).get(session_id).cloned()
    }

    /// Resolves a session code to a session id. Exact match only.
    pub(crate) fn session_id_for_code(&self, code: &str) -> Option<String> {
        read(&self.codes).get(code).cloned()
    }

    /// Finds which session owns an entity.
    pub(crate) fn owner_of(&self, kind: EntityKind, id: &str) -> StoreResult<String> {
        read(&self.owners)
            .get(&(kind, id.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(kind.label(), id))
    }

    /// Records that `session_id` owns the entity. Call with the session
    /// mutex held.
    pub(crate) fn index(&self, kind: EntityKind, id: &str, session_id: &str) {
        write(&self.owners).insert((kind, id.to_string()), session_id.to_string());
    }

    /// Drops index entries. Call with the session mutex held.
    pub(crate) fn unindex<'a>(&self, kind: EntityKind, ids: impl IntoIterator<Item = &'a str>) {
        let mut owners = write(&self.owners);
        for id in ids {
            owners.remove(&(kind, id.to_string()));
        }
    }

    /// Runs `f` against a live session under its lock.
    pub(crate) fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&Session) -> R,
    ) -> StoreResult<R> {
        let handle = self
            .handle(session_id)
            .ok_or_else(|| StoreError::not_found("Session", session_id))?;
        let record = lock(&handle);
        if record.deleted {
            return Err(StoreError::not_found("Session", session_id));
        }
        Ok(f(&record.session))
    }

    /// Runs a mutation under the session's lock with `updated_at` already
    /// bumped, so snapshots taken inside `f` carry the new timestamp.
    ///
    /// `f` must validate before it writes. On `Err` the previous
    /// `updated_at` is restored.
    pub(crate) fn with_session_mut<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut Session) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let handle = self
            .handle(session_id)
            .ok_or_else(|| StoreError::not_found("Session", session_id))?;
        let mut record = lock(&handle);
        if record.deleted {
            return Err(StoreError::not_found("Session", session_id));
        }

        let previous = record.session.updated_at;
        record.session.touch();
        f(&mut record.session).map_err(|err| {
            record.session.updated_at = previous;
            err
        })
    }

    /// Like [`StoreState::with_session_mut`], resolving the session through
    /// an owned entity's id. A dangling owner reports the entity as missing.
    pub(crate) fn with_owner_mut<R>(
        &self,
        kind: EntityKind,
        id: &str,
        f: impl FnOnce(&mut Session) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let session_id = self.owner_of(kind, id)?;
        self.with_session_mut(&session_id, f).map_err(|err| match err {
            StoreError::NotFound { entity, .. } if entity == "Session" => {
                StoreError::not_found(kind.label(), id)
            }
            other => other,
        })
    }

    /// Publishes a freshly built session under a newly generated code and
    /// indexes the items it was created with.
    ///
    /// `build` receives the code and returns the session to insert. The
    /// code index stays write-locked from generation to insertion, and the
    /// session is unreachable until the sessions map guard drops.
    pub(crate) fn insert_session(&self, build: impl FnOnce(String) -> Session) -> Session {
        let mut sessions = write(&self.sessions);
        let mut codes = write(&self.codes);

        let code = generate_unique_code(&mut rand::thread_rng(), |candidate| {
            codes.contains_key(candidate)
        });
        let session = build(code.clone());

        for item in &session.items {
            self.index(EntityKind::Item, &item.id, &session.id);
        }

        codes.insert(code, session.id.clone());
        sessions.insert(
            session.id.clone(),
            Arc::new(Mutex::new(SessionRecord {
                session: session.clone(),
                deleted: false,
            })),
        );

        debug!(session_id = %session.id, code = %session.session_code, "Session published");
        session
    }

    /// Removes a session's map and code entries. Call with the session
    /// mutex held and `deleted` already set.
    pub(crate) fn remove_session(&self, session_id: &str, code: &str) {
        write(&self.sessions).remove(session_id);

        let mut codes = write(&self.codes);
        if codes.get(code).map(String::as_str) == Some(session_id) {
            codes.remove(code);
        }
    }

    #[cfg(test)]
    pub(crate) fn index_len(&self) -> usize {
        read(&self.owners).len()
    }

    #[cfg(test)]
    pub(crate) fn receipt_count(&self) -> usize {
        read(&self.receipts).len()
    }
}

// =============================================================================
// Store
// =============================================================================

/// Entry point to every repository.
///
/// Cloning is cheap: clones share the same state.
///
/// ## Usage
/// ```rust
/// use tabsplit_core::SessionCreate;
/// use tabsplit_store::Store;
///
/// let store = Store::new();
/// let session = store.sessions().create(SessionCreate::default()).unwrap();
///
/// let found = store.sessions().get_by_code(&session.session_code).unwrap();
/// assert_eq!(found.id, session.id);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Store {
    state: Arc<StoreState>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Store::default()
    }

    /// Creates an empty store that keeps at most `capacity` receipt images
    /// (minimum 1).
    pub fn with_receipt_capacity(capacity: usize) -> Self {
        Store {
            state: Arc::new(StoreState {
                receipts: RwLock::new(ReceiptShelf::with_capacity(capacity)),
                ..StoreState::default()
            }),
        }
    }

    /// Returns the session repository.
    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self.state.clone())
    }

    /// Returns the participant repository.
    pub fn participants(&self) -> ParticipantRepository {
        ParticipantRepository::new(self.state.clone())
    }

    /// Returns the bill item repository.
    pub fn items(&self) -> ItemRepository {
        ItemRepository::new(self.state.clone())
    }

    /// Returns the assignment repository.
    pub fn assignments(&self) -> AssignmentRepository {
        AssignmentRepository::new(self.state.clone())
    }

    /// Returns the receipt repository.
    pub fn receipts(&self) -> ReceiptRepository {
        ReceiptRepository::new(self.state.clone())
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &StoreState {
        &self.state
    }
}
