use super::{error_response, success_response};
use crate::session::SessionManager;
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Opens an account with the configured starting balance.
///
/// - **Method**: POST
/// - **Path**: `/api/accounts`
///
/// ```json
/// { "username": "amy", "display_name": "Amy" }
/// ```
///
/// Responds `201 Created` with the account, `409 account_exists` for a taken
/// name and `400 invalid_username` for names that are not ASCII alphanumeric.
pub async fn register(sessions: Arc<SessionManager>, request: RegisterRequest) -> Response {
    let display_name = request.display_name.unwrap_or_default();
    match sessions.register(&request.username, &display_name) {
        Ok(account) => success_response(StatusCode::CREATED, account),
        Err(err) => error_response(err),
    }
}

/// `GET /api/accounts/{user}`: the account and its current balance.
pub async fn get_account(sessions: Arc<SessionManager>, username: String) -> Response {
    match sessions.account(&username) {
        Ok(account) => success_response(StatusCode::OK, account),
        Err(err) => error_response(err),
    }
}

/// `DELETE /api/accounts/{user}`: drops the balance, the card collection and
/// any sessions still open for the user.
pub async fn close_account(sessions: Arc<SessionManager>, username: String) -> Response {
    match sessions.close_account(&username) {
        Ok(account) => success_response(StatusCode::OK, account),
        Err(err) => error_response(err),
    }
}
