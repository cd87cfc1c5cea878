//! # Receipt Repository
//!
//! Uploaded receipt images and what the vision model made of them.
//!
//! ```text
//! upload ──► save_image() ──► { receiptId, imageUrl: /uploads/{id}.{ext} }
//!                 │
//! scan   ──► image() ──► (vision call, no lock held) ──► save_scan()
//!                                                            │
//! fetch  ──► get() ◄─────────────────────────────────────────┘
//! ```
//!
//! Receipts are not linked to sessions; a client copies the item drafts into
//! a session when it is ready. Only the most recent uploads are kept (see
//! [`Store::with_receipt_capacity`](crate::Store::with_receipt_capacity)).

use std::sync::Arc;

use tabsplit_core::receipt::{ImageFormat, ParsedReceipt, Receipt, ReceiptUpload};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{read, write, ReceiptRecord, StoreState};

/// Repository for receipt images and scan results.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    state: Arc<StoreState>,
}

impl ReceiptRepository {
    pub(crate) fn new(state: Arc<StoreState>) -> Self {
        ReceiptRepository { state }
    }

    /// Stores image bytes under a fresh receipt id, evicting the oldest
    /// receipt when the store is full.
    pub fn save_image(&self, bytes: Vec<u8>) -> ReceiptUpload {
        let receipt_id = Uuid::new_v4().to_string();
        let format = ImageFormat::detect_or_jpeg(&bytes);
        let image_url = format!("/uploads/{}.{}", receipt_id, format.extension());

        debug!(
            receipt_id = %receipt_id,
            media_type = format.media_type(),
            size = bytes.len(),
            "Receipt image stored"
        );
        let evicted = write(&self.state.receipts).insert(
            receipt_id.clone(),
            ReceiptRecord {
                image: bytes.into(),
                format,
                parsed: None,
            },
        );
        for old in &evicted {
            debug!(receipt_id = %old, "Receipt evicted");
        }

        ReceiptUpload {
            receipt_id,
            image_url,
        }
    }

    /// Returns the stored image and its detected format.
    pub fn image(&self, receipt_id: &str) -> StoreResult<(Arc<[u8]>, ImageFormat)> {
        read(&self.state.receipts)
            .get(receipt_id)
            .map(|record| (record.image.clone(), record.format))
            .ok_or_else(|| StoreError::not_found("Receipt", receipt_id))
    }

    /// Records a scan result and returns the validated view. A rescan
    /// replaces the previous result.
    pub fn save_scan(&self, receipt_id: &str, parsed: ParsedReceipt) -> StoreResult<Receipt> {
        let view = Receipt::from_parsed(receipt_id, &parsed);

        let mut receipts = write(&self.state.receipts);
        let record = receipts
            .get_mut(receipt_id)
            .ok_or_else(|| StoreError::not_found("Receipt", receipt_id))?;
        record.parsed = Some(parsed);

        info!(
            receipt_id = %receipt_id,
            items = view.items.len(),
            total_cents = ?view.total_cents,
            confidence = ?view.confidence,
            valid = view.validation.is_valid,
            "Receipt parsed"
        );
        Ok(view)
    }

    /// Returns a scanned receipt. Uploaded-but-unscanned receipts are
    /// reported as not found.
    pub fn get(&self, receipt_id: &str) -> StoreResult<Receipt> {
        read(&self.state.receipts)
            .get(receipt_id)
            .and_then(|record| record.parsed.as_ref())
            .map(|parsed| Receipt::from_parsed(receipt_id, parsed))
            .ok_or_else(|| StoreError::not_found("Receipt", receipt_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
