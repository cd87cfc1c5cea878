//! Bill item routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tabsplit_core::{BillItem, BillItemCreate, BillItemUpdate};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/sessions/{id}/items
pub async fn list_items(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<BillItem>>, ApiError> {
    Ok(Json(state.store.items().list(&session_id)?))
}

/// POST /api/sessions/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(data): Json<BillItemCreate>,
) -> Result<(StatusCode, Json<BillItem>), ApiError> {
    debug!(session_id = %session_id, name = %data.name, "add_item");
    let item = state.store.items().add(&session_id, data)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/sessions/items/{iid}
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(update): Json<BillItemUpdate>,
) -> Result<Json<BillItem>, ApiError> {
    debug!(item_id = %item_id, "update_item");
    Ok(Json(state.store.items().update(&item_id, update)?))
}

/// DELETE /api/sessions/items/{iid}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(item_id = %item_id, "delete_item");
    if state.store.items().delete(&item_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Item", &item_id))
    }
}
