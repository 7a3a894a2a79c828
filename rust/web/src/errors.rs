/// HTTP error mapping for the arcade API.
///
/// Engine and ledger errors are classified once here so every handler
/// answers with the same status codes and `ErrorResponse` body.
use popcorn_engine::errors::{ErrorKind, GameError};
use crate::settings::SettingsError;
use popcorn_engine::ledger::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

/// Standard error response format for all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "session_not_found")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        reply::with_status(reply::json(&self), status).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Rejected requests (4xx)
    Client,
    /// Store outages and broken configuration (5xx)
    Server,
    /// Poisoned shared state
    Critical,
}

pub trait IntoErrorResponse {
    fn status_code(&self) -> StatusCode;

    fn error_code(&self) -> &'static str;

    fn error_message(&self) -> String;

    fn error_details(&self) -> Option<serde_json::Value> {
        None
    }

    fn severity(&self) -> ErrorSeverity {
        if self.status_code().is_server_error() {
            ErrorSeverity::Server
        } else {
            ErrorSeverity::Client
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        if let Some(details) = self.error_details() {
            ErrorResponse::with_details(self.error_code(), self.error_message(), details)
        } else {
            ErrorResponse::new(self.error_code(), self.error_message())
        }
    }

    /// Converts to an HTTP response, logging at a level matching the severity.
    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        let status = self.status_code();
        let body = self.to_error_response();

        match self.severity() {
            ErrorSeverity::Client => {
                tracing::info!(error = %body.error, status = status.as_u16(), "{}", body.message)
            }
            ErrorSeverity::Server => {
                tracing::error!(error = %body.error, status = status.as_u16(), "{}", body.message)
            }
            ErrorSeverity::Critical => tracing::error!(
                error = %body.error,
                status = status.as_u16(),
                critical = true,
                "{}",
                body.message
            ),
        }

        body.into_response(status)
    }
}

impl IntoErrorResponse for GameError {
    fn status_code(&self) -> StatusCode {
        match self {
            GameError::Ledger(err) => err.status_code(),
            GameError::UnknownPool(_) => StatusCode::NOT_FOUND,
            GameError::WrongStage { .. }
            | GameError::GameOver
            | GameError::NoGameInProgress
            | GameError::InsufficientBalance { .. } => StatusCode::CONFLICT,
            _ => match self.kind() {
                ErrorKind::InvalidAction => StatusCode::BAD_REQUEST,
                ErrorKind::LedgerFailure => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            GameError::WrongStage { .. } => "wrong_stage",
            GameError::PositionOutOfRange { .. } | GameError::SlotOutOfRange { .. } => {
                "out_of_range"
            }
            GameError::InvalidBetAmount { .. } => "invalid_bet",
            GameError::InsufficientBalance { .. } => "insufficient_balance",
            GameError::UnsupportedDrawCount(_) => "unsupported_draw_count",
            GameError::GameOver => "game_over",
            GameError::NoGameInProgress => "no_game_in_progress",
            GameError::NoPoolSelected => "no_pool_selected",
            GameError::Ledger(err) => err.error_code(),
            GameError::EmptyPool(_) => "empty_pool",
            GameError::UnknownPool(_) => "pool_not_found",
            GameError::InvalidBoard(_) => "invalid_board",
        }
    }

    fn error_message(&self) -> String {
        match self.kind() {
            ErrorKind::LedgerFailure => format!("{self}; please try again"),
            _ => self.to_string(),
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            GameError::WrongStage { action, stage } => Some(serde_json::json!({
                "action": action,
                "stage": stage,
            })),
            GameError::InsufficientBalance { needed, balance } => Some(serde_json::json!({
                "needed": needed,
                "balance": balance,
            })),
            _ => None,
        }
    }
}

impl IntoErrorResponse for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::UnknownAccount(_) => StatusCode::NOT_FOUND,
            LedgerError::InsufficientFunds { .. } | LedgerError::AccountExists(_) => {
                StatusCode::CONFLICT
            }
            LedgerError::InvalidUsername(_) => StatusCode::BAD_REQUEST,
            LedgerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            LedgerError::UnknownAccount(_) => "account_not_found",
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::AccountExists(_) => "account_exists",
            LedgerError::InvalidUsername(_) => "invalid_username",
            LedgerError::Unavailable(_) => "ledger_unavailable",
        }
    }

    fn error_message(&self) -> String {
        match self {
            LedgerError::Unavailable(_) => format!("{self}; please try again"),
            _ => self.to_string(),
        }
    }
}

impl IntoErrorResponse for SettingsError {
    fn status_code(&self) -> StatusCode {
        match self {
            SettingsError::InvalidValue(_) => StatusCode::BAD_REQUEST,
            SettingsError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SettingsError::InvalidValue(_) => "invalid_settings",
            SettingsError::StoragePoisoned => "settings_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            SettingsError::StoragePoisoned => ErrorSeverity::Critical,
            SettingsError::InvalidValue(_) => ErrorSeverity::Client,
        }
    }
}
