use super::{error_response, success_response};
use crate::settings::SettingsStore;
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub starting_balance: Option<u64>,
    pub session_timeout_minutes: Option<u64>,
    pub memory_time_limit_secs: Option<u64>,
    pub memory_pairs: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFieldRequest {
    pub field: String,
    pub value: serde_json::Value,
}

pub async fn get_settings(store: Arc<SettingsStore>) -> Response {
    match store.get() {
        Ok(settings) => success_response(StatusCode::OK, settings),
        Err(err) => error_response(err),
    }
}

/// `PUT /api/settings`: fields left out keep their current value.
pub async fn update_settings(
    store: Arc<SettingsStore>,
    request: UpdateSettingsRequest,
) -> Response {
    let mut current = match store.get() {
        Ok(s) => s,
        Err(err) => return error_response(err),
    };

    if let Some(balance) = request.starting_balance {
        current.starting_balance = balance;
    }
    if let Some(timeout) = request.session_timeout_minutes {
        current.session_timeout_minutes = timeout;
    }
    if let Some(limit) = request.memory_time_limit_secs {
        current.memory_time_limit_secs = limit;
    }
    if let Some(pairs) = request.memory_pairs {
        current.memory_pairs = pairs;
    }

    match store.update(current) {
        Ok(settings) => success_response(StatusCode::OK, settings),
        Err(err) => error_response(err),
    }
}

pub async fn update_field(store: Arc<SettingsStore>, request: UpdateFieldRequest) -> Response {
    match store.update_field(&request.field, request.value) {
        Ok(settings) => success_response(StatusCode::OK, settings),
        Err(err) => error_response(err),
    }
}

pub async fn reset_settings(store: Arc<SettingsStore>) -> Response {
    match store.reset() {
        Ok(settings) => success_response(StatusCode::OK, settings),
        Err(err) => error_response(err),
    }
}
