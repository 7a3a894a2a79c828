//! HTTP front end for the popcorn arcade.
//!
//! Players register an account, open a session and drive it with JSON
//! actions; balances, collections and settlements live in the shared
//! stores owned by [`SessionManager`].

pub mod errors;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod session;
pub mod settings;

pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use logging::{
    init_logging, init_test_logging, LogEntry, TestLogSubscriber, DEFAULT_LOG_FILTER,
};
pub use middleware::{log_response, with_request_logging};
pub use server::{
    handle_rejection, starter_pools, AppContext, ServerConfig, ServerError, ServerHandle,
    WebServer,
};
pub use session::{
    ActionResponse, ArcadeSession, SessionError, SessionId, SessionManager, SessionResponse,
};
pub use settings::{AppSettings, SettingsError, SettingsStore};
