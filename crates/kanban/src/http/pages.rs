//! Server-rendered board and its form actions.
//!
//! Every form action redirects back to `/` with `303 See Other` so a refresh
//! never resubmits.

use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::Form;
use minijinja::context;
use serde::Deserialize;

use super::response::PageError;
use super::AppState;
use crate::board::{CardMove, CardUpdate, NewCard};

type PageResult<T> = std::result::Result<T, PageError>;

/// Fields of the "new card" form.
#[derive(Debug, Deserialize)]
pub(super) struct CardForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    column: String,
    #[serde(default)]
    project: String,
}

/// Fields of the per-card edit form.
#[derive(Debug, Deserialize)]
pub(super) struct EditForm {
    title: Option<String>,
    description: Option<String>,
}

/// Fields of the per-card move form.
#[derive(Debug, Deserialize)]
pub(super) struct MoveForm {
    column: String,
}

/// GET /
pub(super) async fn board_page(State(state): State<AppState>) -> PageResult<Html<String>> {
    let board = state
        .service
        .board()
        .await
        .map_err(|e| PageError::new(&state, e))?;
    let html = state
        .templates
        .get_template("board.html")
        .and_then(|tmpl| {
            tmpl.render(context!(
                columns => &board.columns,
                projects => &board.projects,
                card_count => board.card_count(),
            ))
        })
        .map_err(|e| PageError::new(&state, e.into()))?;
    Ok(Html(html))
}

/// POST /cards
pub(super) async fn create_card(
    State(state): State<AppState>,
    Form(form): Form<CardForm>,
) -> PageResult<Redirect> {
    let new = NewCard {
        title: Some(form.title.trim().to_string()),
        description: Some(form.description),
        column: Some(form.column),
        project: Some(form.project),
        ..NewCard::default()
    };
    state
        .service
        .create_card(new)
        .await
        .map_err(|e| PageError::new(&state, e))?;
    Ok(Redirect::to("/"))
}

/// POST /cards/:id/edit
pub(super) async fn edit_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    Form(form): Form<EditForm>,
) -> PageResult<Redirect> {
    let update = CardUpdate {
        title: form.title.filter(|t| !t.trim().is_empty()),
        description: form.description,
        ..CardUpdate::default()
    };
    state
        .service
        .update_card(&card_id, update)
        .await
        .map_err(|e| PageError::new(&state, e))?;
    Ok(Redirect::to("/"))
}

/// POST /cards/:id/move
pub(super) async fn move_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    Form(form): Form<MoveForm>,
) -> PageResult<Redirect> {
    let to = CardMove {
        column: form.column,
        position: None,
    };
    state
        .service
        .move_card(&card_id, to)
        .await
        .map_err(|e| PageError::new(&state, e))?;
    Ok(Redirect::to("/"))
}

/// POST /cards/:id/delete
pub(super) async fn delete_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> PageResult<Redirect> {
    state
        .service
        .delete_card(&card_id)
        .await
        .map_err(|e| PageError::new(&state, e))?;
    Ok(Redirect::to("/"))
}
