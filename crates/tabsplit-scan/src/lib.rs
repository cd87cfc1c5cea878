//! # tabsplit-scan: Receipt Scanning for Tab Split
//!
//! The one crate that leaves the process: it sends receipt images to a
//! vision model and turns the reply into a [`ParsedReceipt`].
//!
//! ## Module Organization
//! ```text
//! tabsplit_scan/
//! ├── config.rs   ← VisionConfig (env driven)
//! ├── error.rs    ← ScanError
//! ├── extract.rs  ← JSON extraction from model text
//! └── vision.rs   ← VisionClient (Anthropic Messages API)
//! ```
//!
//! The HTTP layer depends on the [`ReceiptScanner`] trait, not on
//! [`VisionClient`], so tests can swap in a canned scanner.

pub mod config;
pub mod error;
pub mod extract;
pub mod vision;

use async_trait::async_trait;
use tabsplit_core::receipt::{ImageFormat, ParsedReceipt};

pub use config::VisionConfig;
pub use error::{ScanError, ScanResult};
pub use extract::extract_json;
pub use vision::VisionClient;

/// Anything that can read a receipt image.
#[async_trait]
pub trait ReceiptScanner: Send + Sync {
    /// Parses one receipt image into line items and totals.
    async fn scan(&self, image: &[u8], format: ImageFormat) -> ScanResult<ParsedReceipt>;
}
