#![allow(dead_code)]

use popcorn_web::{AppContext, ServerConfig, WebServer};
use serde_json::Value;
use warp::http::StatusCode;

/// In-process arcade driven through the full route table.
pub struct TestArcade {
    pub ctx: AppContext,
}

impl TestArcade {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::for_tests())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            ctx: AppContext::new(config).expect("test context"),
        }
    }

    pub async fn send(&self, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let app = WebServer::app(&self.ctx);
        let mut request = warp::test::request().method(method).path(path);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.reply(&app).await;
        let status = response.status();
        let json = if response.body().is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(response.body()).expect("json body")
        };
        (status, json)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", path, Some(body)).await
    }

    pub async fn register(&self, username: &str) {
        let (status, _) = self
            .post("/api/accounts", serde_json::json!({ "username": username }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    pub async fn open_session(&self, username: &str, seed: u64) -> String {
        let (status, body) = self
            .post(
                "/api/sessions",
                serde_json::json!({ "username": username, "seed": seed }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().expect("session id").to_string()
    }

    pub async fn act(&self, session_id: &str, action: Value) -> (StatusCode, Value) {
        self.post(
            &format!("/api/sessions/{session_id}/actions"),
            serde_json::json!({ "action": action }),
        )
        .await
    }

    pub async fn balance(&self, username: &str) -> u64 {
        let (status, body) = self.get(&format!("/api/accounts/{username}")).await;
        assert_eq!(status, StatusCode::OK);
        body["balance"].as_u64().expect("balance")
    }
}
