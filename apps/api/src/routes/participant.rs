//! Participant routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tabsplit_core::{Participant, ParticipantCreate, ParticipantUpdate};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/sessions/{id}/participants
pub async fn list_participants(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    Ok(Json(state.store.participants().list(&session_id)?))
}

/// POST /api/sessions/{id}/participants
pub async fn add_participant(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(data): Json<ParticipantCreate>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    debug!(session_id = %session_id, "add_participant");
    let participant = state.store.participants().add(&session_id, data)?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// PUT /api/sessions/participants/{pid}
pub async fn update_participant(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
    Json(update): Json<ParticipantUpdate>,
) -> Result<Json<Participant>, ApiError> {
    debug!(participant_id = %participant_id, "update_participant");
    Ok(Json(state.store.participants().update(&participant_id, update)?))
}

/// POST /api/sessions/participants/{pid}/mark-paid
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> Result<Json<Participant>, ApiError> {
    debug!(participant_id = %participant_id, "mark_paid");
    Ok(Json(state.store.participants().mark_paid(&participant_id)?))
}
