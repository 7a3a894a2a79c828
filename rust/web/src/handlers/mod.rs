pub mod accounts;
pub mod collection;
pub mod game;
pub mod health;
pub mod settings;

pub use accounts::{close_account, get_account, register, RegisterRequest};
pub use collection::{get_collection, list_pools, PoolsResponse};
pub use game::{
    create_session, delete_session, get_session, submit_action, CreateSessionRequest,
    PlayerActionRequest,
};
pub use health::health;
pub use settings::{
    get_settings, reset_settings, update_field, update_settings, UpdateFieldRequest,
    UpdateSettingsRequest,
};

use crate::errors::IntoErrorResponse;
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

fn success_response<T>(status: StatusCode, body: T) -> Response
where
    T: Serialize,
{
    reply::with_status(reply::json(&body), status).into_response()
}

fn error_response<E: IntoErrorResponse>(err: E) -> Response {
    err.into_http_response()
}
