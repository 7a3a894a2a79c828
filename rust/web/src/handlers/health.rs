use serde::Serialize;
use warp::reply::Json;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    active_sessions: usize,
    timestamp: String,
}

pub fn health(active_sessions: usize) -> Json {
    warp::reply::json(&HealthBody {
        status: "ok",
        active_sessions,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
