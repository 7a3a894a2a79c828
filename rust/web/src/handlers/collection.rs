use super::{error_response, success_response};
use crate::session::SessionManager;
use popcorn_engine::collection::CollectionQuery;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;

#[derive(Debug, Serialize, Deserialize)]
pub struct PoolsResponse {
    pub pools: Vec<String>,
}

/// `GET /api/pools`: names of every gacha pool the server can draw from.
pub async fn list_pools(sessions: Arc<SessionManager>) -> Response {
    success_response(
        StatusCode::OK,
        PoolsResponse {
            pools: sessions.pools(),
        },
    )
}

/// Lists a user's collection for one pool, rarest tier first.
///
/// - **Method**: GET
/// - **Path**: `/api/collection/{user}/{pool}?rarity=SSR&owned_only=true`
/// - **Error (404 Not Found)**: `account_not_found` or `pool_not_found`
pub async fn get_collection(
    sessions: Arc<SessionManager>,
    username: String,
    pool: String,
    query: CollectionQuery,
) -> Response {
    match sessions.collection(&username, &pool, &query) {
        Ok(collection) => success_response(StatusCode::OK, collection),
        Err(err) => error_response(err),
    }
}
