//! # Session Routes
//!
//! ```text
//! POST   /api/sessions                  create (optionally with items)
//! GET    /api/sessions/{id}             fetch by id
//! GET    /api/sessions/code/{code}      fetch by share code, any letter case
//! PUT    /api/sessions/{id}             partial update
//! DELETE /api/sessions/{id}             delete with everything it owns
//! POST   /api/sessions/join             join by code
//! POST   /api/sessions/{id}/complete    mark completed
//! GET    /api/sessions/{id}/balances    who owes what
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tabsplit_core::balance::SessionBalances;
use tabsplit_core::code::{is_valid_code, normalize_code};
use tabsplit_core::{JoinSessionRequest, JoinSessionResponse, Session, SessionCreate, SessionUpdate};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_session(
    State(state): State<AppState>,
    Json(data): Json<SessionCreate>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    debug!(items = data.items.len(), "create_session");
    let session = state.store.sessions().create(data)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    debug!(session_id = %session_id, "get_session");
    Ok(Json(state.store.sessions().get(&session_id)?))
}

/// Codes are matched after trimming and upper-casing; anything that
/// cannot be a code is a 404 without touching the store.
pub async fn get_session_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let code = normalize_code(&code);
    debug!(code = %code, "get_session_by_code");

    if !is_valid_code(&code) {
        return Err(ApiError::not_found("Session with code", &code));
    }
    Ok(Json(state.store.sessions().get_by_code(&code)?))
}

pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(update): Json<SessionUpdate>,
) -> Result<Json<Session>, ApiError> {
    debug!(session_id = %session_id, "update_session");
    Ok(Json(state.store.sessions().update(&session_id, update)?))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(session_id = %session_id, "delete_session");
    if state.store.sessions().delete(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Session", &session_id))
    }
}

pub async fn join_session(
    State(state): State<AppState>,
    Json(mut request): Json<JoinSessionRequest>,
) -> Result<Json<JoinSessionResponse>, ApiError> {
    request.session_code = normalize_code(&request.session_code);
    debug!(code = %request.session_code, "join_session");
    Ok(Json(state.store.sessions().join(request)?))
}

pub async fn complete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    debug!(session_id = %session_id, "complete_session");
    Ok(Json(state.store.sessions().complete(&session_id)?))
}

pub async fn get_balances(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionBalances>, ApiError> {
    debug!(session_id = %session_id, "get_balances");
    Ok(Json(state.store.sessions().balances(&session_id)?))
}
