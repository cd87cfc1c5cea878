//! # Repository Module
//!
//! Repository implementations over the in-memory store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  store.items().update(item_id, update)                         │
//! │       ▼                                                                 │
//! │  ItemRepository                                                        │
//! │  ├── owner_of(Item, item_id)      → session id                         │
//! │  ├── with_owner_mut(...)          → session mutex held                 │
//! │  │     ├── validate                                                     │
//! │  │     ├── mutate                                                       │
//! │  │     └── updated_at bumped                                            │
//! │  └── return a clone                                                     │
//! │                                                                         │
//! │  Every repository is a cheap handle onto the same shared state.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`session::SessionRepository`] - Session lifecycle, join by code
//! - [`participant::ParticipantRepository`] - Participants and payments
//! - [`item::ItemRepository`] - Bill items
//! - [`assignment::AssignmentRepository`] - Assignments and item splitting
//! - [`receipt::ReceiptRepository`] - Uploaded images and scan results

pub mod assignment;
pub mod item;
pub mod participant;
pub mod receipt;
pub mod session;
