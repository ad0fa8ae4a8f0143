//! HTTP surface: JSON API, server-rendered board, health check.

mod api;
mod extract;
mod pages;
mod response;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use minijinja::Environment;
use tracing::warn;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::service::BoardService;

const BOARD_HTML: &str = include_str!("templates/board.html");
const ERROR_HTML: &str = include_str!("templates/error.html");

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    service: BoardService,
    templates: Arc<Environment<'static>>,
    request_timeout: Duration,
    max_body_bytes: usize,
}

impl AppState {
    /// State with the default server limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled templates fail to compile.
    pub fn new(service: BoardService) -> Result<Self> {
        Self::with_config(service, &ServerConfig::default())
    }

    /// State with limits taken from `server`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled templates fail to compile.
    pub fn with_config(service: BoardService, server: &ServerConfig) -> Result<Self> {
        Ok(Self {
            service,
            templates: Arc::new(templates()?),
            request_timeout: Duration::from_secs(server.request_timeout_secs),
            max_body_bytes: server.max_body_bytes,
        })
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The board service behind the routes.
    #[must_use]
    pub fn service(&self) -> &BoardService {
        &self.service
    }
}

fn templates() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("board.html", BOARD_HTML)?;
    env.add_template("error.html", ERROR_HTML)?;
    Ok(env)
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.max_body_bytes;
    Router::new()
        .route("/", get(pages::board_page))
        .route("/cards", post(pages::create_card))
        .route("/cards/:id/edit", post(pages::edit_card))
        .route("/cards/:id/move", post(pages::move_card))
        .route("/cards/:id/delete", post(pages::delete_card))
        .route("/healthz", get(api::healthz))
        .route("/api/board", get(api::board))
        .route("/api/card", post(api::create_card))
        .route(
            "/api/card/:id",
            put(api::update_card)
                .post(api::update_card)
                .delete(api::delete_card),
        )
        .route("/api/card/:id/move", post(api::move_card))
        .route("/api/columns", get(api::columns))
        .route("/api/column", post(api::create_column))
        .route(
            "/api/column/:id",
            put(api::update_column).delete(api::delete_column),
        )
        .route("/api/projects", get(api::projects))
        .route("/api/project", post(api::create_project))
        .route(
            "/api/project/:idx",
            put(api::update_project).delete(api::delete_project),
        )
        .layer(from_fn_with_state(state.clone(), timeout_middleware))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}

async fn timeout_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if let Ok(resp) = tokio::time::timeout(state.request_timeout, next.run(req)).await {
        resp
    } else {
        warn!(%path, timeout = ?state.request_timeout, "request timed out");
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(serde_json::json!({"error": "request timed out"})),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_compile() {
        let env = templates().unwrap();
        assert!(env.get_template("board.html").is_ok());
        assert!(env.get_template("error.html").is_ok());
    }
}
