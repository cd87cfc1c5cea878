//! # Route Handlers
//!
//! ```text
//! routes/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── health.rs       ◄─── GET /, GET /health
//! ├── session.rs      ◄─── /api/sessions, by id, by code, join, balances
//! ├── participant.rs  ◄─── /api/sessions/{id}/participants, /participants/{pid}
//! ├── item.rs         ◄─── /api/sessions/{id}/items, /items/{iid}
//! ├── assignment.rs   ◄─── /api/sessions/items/assign, /assignments/{aid}
//! └── receipt.rs      ◄─── /api/receipts upload, scan, fetch
//! ```
//!
//! Handlers only translate: pull ids out of the path, call a repository,
//! wrap the answer in a status code.

pub mod assignment;
pub mod health;
pub mod item;
pub mod participant;
pub mod receipt;
pub mod session;
