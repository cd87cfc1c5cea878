//! # Receipt Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/receipts/upload     multipart "image" ──► 201 {receiptId}    │
//! │                                                                         │
//! │  POST /api/receipts/{rid}/scan                                          │
//! │        store.image() ──► scanner.scan() ──► store.save_scan()           │
//! │                          (no store lock held,                           │
//! │                           client timeout applies)                       │
//! │                                                                         │
//! │  GET  /api/receipts/{rid}      last scan result + validation            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use tabsplit_core::receipt::{Receipt, ReceiptUpload};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";

/// POST /api/receipts/upload
pub async fn upload_receipt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ReceiptUpload>), ApiError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let is_image = field
            .content_type()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            warn!(content_type = ?field.content_type(), "Rejected non-image upload");
            return Err(ApiError::invalid_request(
                "File must be an image (JPEG, PNG, or WebP)",
            ));
        }

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::invalid_request("Uploaded image is empty"));
        }

        let upload = state.store.receipts().save_image(bytes.to_vec());
        info!(receipt_id = %upload.receipt_id, size = bytes.len(), "Receipt uploaded");
        return Ok((StatusCode::CREATED, Json(upload)));
    }

    Err(ApiError::invalid_request("Missing multipart field \"image\""))
}

/// POST /api/receipts/{rid}/scan
pub async fn scan_receipt(
    State(state): State<AppState>,
    Path(receipt_id): Path<String>,
) -> Result<Json<Receipt>, ApiError> {
    debug!(receipt_id = %receipt_id, "scan_receipt");

    let (image, format) = state.store.receipts().image(&receipt_id)?;
    let parsed = state.scanner.scan(&image, format).await?;
    let receipt = state.store.receipts().save_scan(&receipt_id, parsed)?;

    Ok(Json(receipt))
}

/// GET /api/receipts/{rid}
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(receipt_id): Path<String>,
) -> Result<Json<Receipt>, ApiError> {
    debug!(receipt_id = %receipt_id, "get_receipt");
    Ok(Json(state.store.receipts().get(&receipt_id)?))
}
