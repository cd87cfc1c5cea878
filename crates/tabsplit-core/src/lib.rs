//! # tabsplit-core: Pure Business Logic for Tab Split
//!
//! This crate is the **heart** of Tab Split. It contains the domain types and
//! every piece of arithmetic in the system as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tab Split Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Create ──► Join by code ──► Assign items ──► Settle up      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  └──────────────┬───────────────────────────────┬──────────────────┘   │
//! │                 │                               │                       │
//! │  ┌──────────────▼──────────────┐  ┌─────────────▼──────────────────┐   │
//! │  │  tabsplit-store             │  │  tabsplit-scan                 │   │
//! │  │  sessions, participants,    │  │  vision model client           │   │
//! │  │  items, assignments         │  │  JSON extraction               │   │
//! │  └──────────────┬──────────────┘  └─────────────┬──────────────────┘   │
//! │                 │                               │                       │
//! │  ┌──────────────▼───────────────────────────────▼──────────────────┐   │
//! │  │               ★ tabsplit-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │ types   │ │ money   │ │ split   │ │ receipt │ │  code   │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO SHARED STATE • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Session, Participant, BillItem, ItemAssignment)
//! - [`payloads`] - Create / update payloads and request bodies
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`split`] - Split engine (item line total → per-participant shares)
//! - [`receipt`] - Parsed receipt types and the receipt validator
//! - [`code`] - Session code generation
//! - [`balance`] - Per-participant balances derived from assignments
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use tabsplit_core::money::Money;
//! use tabsplit_core::split::split_item;
//!
//! let line_total = Money::from_cents(2000); // $10.00 × 2
//! let people = vec!["a".to_string(), "b".to_string(), "c".to_string()];
//!
//! let shares = split_item(line_total, &people, true).unwrap();
//! let sum: i64 = shares.iter().map(|s| s.amount.cents()).sum();
//! assert_eq!(sum, 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod code;
pub mod error;
pub mod money;
pub mod payloads;
pub mod receipt;
pub mod split;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payloads::*;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single bill item.
///
/// ## Business Reason
/// Guards against OCR mistakes like reading "1" as "100" on a receipt line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest amount, in cents, accepted for any price or total ($100M).
///
/// With `MAX_ITEM_QUANTITY` this keeps every line total and session sum far
/// inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000;

/// Maximum length of item names, guest names and restaurant names.
pub const MAX_NAME_LENGTH: usize = 200;

/// Rounding tolerance (in cents) used when cross-checking receipt totals.
pub const RECEIPT_TOLERANCE_CENTS: i64 = 2;
