mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{get, send, send_json, spawn_app, spawn_state};
use kanban::config::ServerConfig;
use kanban::{AppState, Board, BoardService, BoardStore, JsonFileStore, StorageBackend};

/// A store that answers every load after a fixed delay.
#[derive(Debug)]
struct SlowStore {
    delay: Duration,
    path: PathBuf,
}

#[async_trait]
impl BoardStore for SlowStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Json
    }

    fn location(&self) -> &Path {
        &self.path
    }

    async fn ensure(&self) -> kanban::Result<()> {
        Ok(())
    }

    async fn load(&self) -> kanban::Result<Board> {
        tokio::time::sleep(self.delay).await;
        Ok(Board::starter())
    }

    async fn save(&self, _board: &Board) -> kanban::Result<()> {
        Ok(())
    }
}

fn slow_state(delay: Duration, timeout: Duration) -> AppState {
    let store = SlowStore {
        delay,
        path: PathBuf::from("slow.json"),
    };
    AppState::new(BoardService::new(Arc::new(store)))
        .expect("app state")
        .with_request_timeout(timeout)
}

#[tokio::test]
async fn slow_request_times_out_with_408() {
    let addr = spawn_state(slow_state(
        Duration::from_secs(5),
        Duration::from_millis(50),
    ))
    .await;

    let resp = get(addr, "/api/board").await;
    assert_eq!(resp.status, 408);
    assert_eq!(resp.json(), serde_json::json!({"error": "request timed out"}));
}

#[tokio::test]
async fn request_within_timeout_succeeds() {
    let addr = spawn_state(slow_state(
        Duration::from_millis(10),
        Duration::from_secs(5),
    ))
    .await;

    let resp = get(addr, "/api/board").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json()["columns"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn corrupt_board_file_is_a_json_500() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("kanban.json"), "{ not json").expect("write board");
    let addr = spawn_app(dir.path()).await;

    let resp = get(addr, "/api/board").await;
    assert_eq!(resp.status, 500);
    let error = resp.json()["error"].as_str().expect("error message").to_string();
    assert!(error.contains("corrupt"), "unexpected error: {error}");

    let resp = send_json(addr, "POST", "/api/card", r#"{"title": "Lost"}"#).await;
    assert_eq!(resp.status, 500);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("kanban.json")).expect("read board"),
        "{ not json"
    );
}

#[tokio::test]
async fn malformed_bodies_are_json_400s() {
    let dir = tempfile::tempdir().expect("tempdir");
    let addr = spawn_app(dir.path()).await;

    for (content_type, body) in [
        ("application/json", r#"{"title": 42}"#),
        ("application/json", "{ not json"),
        ("text/plain", r#"{"title": "Fix bug"}"#),
    ] {
        let resp = send(addr, "POST", "/api/card", content_type, body).await;
        assert_eq!(resp.status, 400, "body {body:?} as {content_type}");
        assert!(resp.json()["error"].is_string());
    }

    let board = get(addr, "/api/board").await.json();
    assert_eq!(board["columns"][0]["cards"], serde_json::json!([]));
}

#[tokio::test]
async fn float_position_is_truncated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let addr = spawn_app(dir.path()).await;
    let first = send_json(addr, "POST", "/api/card", r#"{"title": "a", "column": "done"}"#)
        .await
        .json();
    let second = send_json(addr, "POST", "/api/card", r#"{"title": "b", "column": "done"}"#)
        .await
        .json();
    let moving = send_json(addr, "POST", "/api/card", r#"{"title": "c"}"#)
        .await
        .json();
    let id = moving["id"].as_str().expect("id");

    let resp = send_json(
        addr,
        "PUT",
        &format!("/api/card/{id}"),
        r#"{"column": "done", "position": 1.5}"#,
    )
    .await;
    assert_eq!(resp.status, 200);

    let board = get(addr, "/api/board").await.json();
    let done: Vec<&str> = board["columns"][3]["cards"]
        .as_array()
        .expect("cards")
        .iter()
        .filter_map(|c| c["id"].as_str())
        .collect();
    assert_eq!(
        done,
        [
            first["id"].as_str().expect("id"),
            id,
            second["id"].as_str().expect("id"),
        ]
    );
}

#[tokio::test]
async fn oversized_body_is_a_json_413() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("kanban.json"), Duration::from_millis(500));
    let server = ServerConfig {
        max_body_bytes: 64,
        ..ServerConfig::default()
    };
    let state = AppState::with_config(BoardService::new(Arc::new(store)), &server)
        .expect("app state");
    let addr = spawn_state(state).await;
    let body = format!(r#"{{"title": "big", "description": "{}"}}"#, "x".repeat(256));

    let resp = send_json(addr, "POST", "/api/card", &body).await;
    assert_eq!(resp.status, 413);
    assert!(resp.json()["error"].is_string());
}
