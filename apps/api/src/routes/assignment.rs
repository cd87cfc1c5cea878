//! Assignment routes.
//!
//! `POST /api/sessions/items/assign` splits one item across several
//! participants in a single all-or-nothing step; the other routes work on
//! individual assignment records.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tabsplit_core::{AssignItemRequest, AssignmentCreate, AssignmentUpdate, ItemAssignment};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/sessions/items/assign
pub async fn assign_item(
    State(state): State<AppState>,
    Json(request): Json<AssignItemRequest>,
) -> Result<Json<Vec<ItemAssignment>>, ApiError> {
    debug!(
        item_id = %request.item_id,
        participants = request.participant_ids.len(),
        split_equally = request.split_equally,
        "assign_item"
    );
    Ok(Json(state.store.assignments().assign_item(request)?))
}

/// POST /api/sessions/assignments
pub async fn add_assignment(
    State(state): State<AppState>,
    Json(data): Json<AssignmentCreate>,
) -> Result<(StatusCode, Json<ItemAssignment>), ApiError> {
    debug!(item_id = %data.item_id, participant_id = %data.participant_id, "add_assignment");
    let assignment = state.store.assignments().add(data)?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// PUT /api/sessions/assignments/{aid}
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
    Json(update): Json<AssignmentUpdate>,
) -> Result<Json<ItemAssignment>, ApiError> {
    debug!(assignment_id = %assignment_id, "update_assignment");
    Ok(Json(state.store.assignments().update(&assignment_id, update)?))
}

/// DELETE /api/sessions/assignments/{aid}
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(assignment_id = %assignment_id, "delete_assignment");
    if state.store.assignments().delete(&assignment_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Assignment", &assignment_id))
    }
}
