use super::{error_response, success_response};
use crate::session::{SessionId, SessionManager};
use popcorn_engine::controller::Action;
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub username: String,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerActionRequest {
    pub action: Action,
}

/// Opens a player session in the lobby, replacing any session the user
/// already holds.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/sessions`
///
/// # Request Format
/// ```json
/// { "username": "amy", "seed": 42 }
/// ```
///
/// # Response Format
/// - **Success (201 Created)**: `{ "session_id", "user", "view": { "screen": "lobby" } }`
/// - **Error (404 Not Found)**: `account_not_found` when the user is not registered
pub async fn create_session(
    sessions: Arc<SessionManager>,
    request: CreateSessionRequest,
) -> Response {
    match sessions.create_session(&request.username, request.seed) {
        Ok(created) => success_response(StatusCode::CREATED, created),
        Err(err) => error_response(err),
    }
}

/// Renders the session's current screen.
///
/// Rendering a finished memory game claims its reward, so the response may
/// carry a `movement`.
///
/// - **Method**: GET
/// - **Path**: `/api/sessions/{session_id}`
/// - **Error (404 Not Found)**: `session_not_found`
/// - **Error (410 Gone)**: `session_expired`
pub async fn get_session(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.state(&session_id) {
        Ok(state) => success_response(StatusCode::OK, state),
        Err(err) => error_response(err),
    }
}

/// Applies one player action.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/sessions/{session_id}/actions`
///
/// # Request Format
/// ```json
/// { "action": { "type": "enter", "game": "memory" } }
/// { "action": { "type": "select", "index": 7 } }
/// { "action": { "type": "place_bet", "amount": 30 } }
/// { "action": { "type": "draw", "count": 10, "pool": "spring" } }
/// ```
///
/// # Response Format
/// - **Success (200 OK)**: `{ "session_id", "event", "movement"?, "settlement_error"?, "view" }`
/// - **Error (400 Bad Request)**: malformed or out-of-range input
/// - **Error (409 Conflict)**: action not allowed on the current screen
/// - **Error (503 Service Unavailable)**: the ledger failed; retrying is safe
pub async fn submit_action(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: PlayerActionRequest,
) -> Response {
    match sessions.process_action(&session_id, request.action) {
        Ok(outcome) => success_response(StatusCode::OK, outcome),
        Err(err) => error_response(err),
    }
}

/// Ends the session without settling anything still in play.
pub async fn delete_session(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.delete_session(&session_id) {
        Ok(()) => reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response(),
        Err(err) => error_response(err),
    }
}
