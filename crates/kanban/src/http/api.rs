//! JSON API handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::extract::ApiJson;
use super::AppState;
use crate::board::{
    CardMove, CardUpdate, ColumnUpdate, NewCard, NewColumn, NewProject, ProjectUpdate,
};
use crate::error::{Error, Result};
use crate::model::{Board, Card, Column, Project};

/// Body of `DELETE /api/column/:id`.
#[derive(Debug, Deserialize)]
pub(super) struct DeleteColumn {
    move_to: Option<String>,
}

/// GET /healthz
pub(super) async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/board
pub(super) async fn board(State(state): State<AppState>) -> Result<Json<Board>> {
    Ok(Json(state.service.board().await?))
}

/// POST /api/card
pub(super) async fn create_card(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewCard>,
) -> Result<(StatusCode, Json<Card>)> {
    let card = state.service.create_card(new).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// PUT /api/card/:id
pub(super) async fn update_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    ApiJson(update): ApiJson<CardUpdate>,
) -> Result<Json<Card>> {
    Ok(Json(state.service.update_card(&card_id, update).await?))
}

/// POST /api/card/:id/move
pub(super) async fn move_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    ApiJson(to): ApiJson<CardMove>,
) -> Result<Json<Card>> {
    Ok(Json(state.service.move_card(&card_id, to).await?))
}

/// DELETE /api/card/:id
pub(super) async fn delete_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<Json<Value>> {
    state.service.delete_card(&card_id).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// GET /api/columns
pub(super) async fn columns(State(state): State<AppState>) -> Result<Json<Value>> {
    let columns = state.service.columns().await?;
    Ok(Json(json!({ "columns": columns })))
}

/// POST /api/column
pub(super) async fn create_column(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewColumn>,
) -> Result<(StatusCode, Json<Column>)> {
    let column = state.service.create_column(new).await?;
    Ok((StatusCode::CREATED, Json(column)))
}

/// PUT /api/column/:id
pub(super) async fn update_column(
    State(state): State<AppState>,
    Path(column_id): Path<String>,
    ApiJson(update): ApiJson<ColumnUpdate>,
) -> Result<Json<Column>> {
    Ok(Json(state.service.update_column(&column_id, update).await?))
}

/// DELETE /api/column/:id
///
/// The body is optional.
pub(super) async fn delete_column(
    State(state): State<AppState>,
    Path(column_id): Path<String>,
    body: Option<ApiJson<DeleteColumn>>,
) -> Result<Json<Value>> {
    let move_to = body.and_then(|ApiJson(body)| body.move_to);
    state
        .service
        .delete_column(&column_id, move_to.as_deref())
        .await?;
    Ok(Json(json!({ "deleted": true })))
}

/// GET /api/projects
pub(super) async fn projects(State(state): State<AppState>) -> Result<Json<Value>> {
    let projects = state.service.projects().await?;
    Ok(Json(json!({ "projects": projects })))
}

/// POST /api/project
pub(super) async fn create_project(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewProject>,
) -> Result<(StatusCode, Json<Project>)> {
    let project = state.service.create_project(new).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/project/:idx
pub(super) async fn update_project(
    State(state): State<AppState>,
    Path(index): Path<String>,
    ApiJson(update): ApiJson<ProjectUpdate>,
) -> Result<Json<Project>> {
    let index = project_index(&index)?;
    Ok(Json(state.service.update_project(index, update).await?))
}

/// DELETE /api/project/:idx
pub(super) async fn delete_project(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<Value>> {
    let index = project_index(&index)?;
    state.service.delete_project(index).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// Anything that is not a non-negative integer names no project.
fn project_index(raw: &str) -> Result<usize> {
    raw.parse().map_err(|_| Error::project_not_found())
}
