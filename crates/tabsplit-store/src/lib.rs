//! # tabsplit-store: Entity Store for Tab Split
//!
//! This crate holds every live session in process memory and exposes it
//! through repositories.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tab Split Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/sessions/items/assign)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  tabsplit-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │  Repositories │    │ tabsplit-core│  │   │
//! │  │   │  (store.rs)   │    │               │    │              │  │   │
//! │  │   │               │    │ SessionRepo   │    │ split_item   │  │   │
//! │  │   │ per-session   │◄───│ ItemRepo      │───►│ validation   │  │   │
//! │  │   │ mutexes +     │    │ AssignmentRepo│    │ code gen     │  │   │
//! │  │   │ id indexes    │    │ ...           │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Shared state, lock helpers and the [`Store`] entry point
//! - [`error`] - Store error types
//! - [`repository`] - Repository implementations (session, item, etc.)
//!
//! ## Usage
//!
//! ```rust
//! use tabsplit_core::{AssignItemRequest, BillItemCreate, ParticipantCreate, SessionCreate};
//! use tabsplit_store::Store;
//!
//! let store = Store::new();
//! let session = store.sessions().create(SessionCreate::default()).unwrap();
//!
//! let ana = store.participants().add(&session.id, ParticipantCreate::guest("Ana")).unwrap();
//! let ben = store.participants().add(&session.id, ParticipantCreate::guest("Ben")).unwrap();
//! let pizza = store.items().add(&session.id, BillItemCreate::new("Pizza", 2000)).unwrap();
//!
//! let shares = store.assignments().assign_item(AssignItemRequest {
//!     item_id: pizza.id,
//!     participant_ids: vec![ana.id, ben.id],
//!     split_equally: true,
//! }).unwrap();
//! assert_eq!(shares[0].amount_cents, 1000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use store::{EntityKind, Store, MAX_STORED_RECEIPTS};

// Repository re-exports for convenience
pub use repository::assignment::AssignmentRepository;
pub use repository::item::ItemRepository;
pub use repository::participant::ParticipantRepository;
pub use repository::receipt::ReceiptRepository;
pub use repository::session::SessionRepository;
