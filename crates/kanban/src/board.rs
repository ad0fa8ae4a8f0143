//! In-memory board operations.
//!
//! Every function here takes the whole [`Board`] by mutable reference and
//! either applies one change or returns an error without touching it. Loading
//! and persisting the board is the caller's job (see [`crate::service`]).

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::Utc;
use rand::Rng;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{
    Board, Card, Column, Link, Project, DEFAULT_CARD_COLOR, DEFAULT_COLUMN_COLOR,
    DEFAULT_COLUMN_ID,
};

/// Link schemes rendered as anchors.
const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Attempts at picking a project colour not already in use.
const COLOR_ATTEMPTS: usize = 32;

static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// Fields accepted when creating a card.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCard {
    /// Required, non-empty.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Destination column; defaults to `todo`.
    pub column: Option<String>,
    /// Colour, ignored when a project is given.
    pub color: Option<String>,
    /// Project name to tag the card with.
    pub project: Option<String>,
    /// Raw links; invalid entries are dropped.
    pub links: Option<Value>,
}

/// Fields accepted when updating a card. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CardUpdate {
    /// Move the card to this column.
    pub column: Option<String>,
    /// Slot in the destination column, only honoured with `column`.
    #[serde(deserialize_with = "position")]
    pub position: Option<i64>,
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New colour.
    pub color: Option<String>,
    /// Replacement links.
    pub links: Option<Value>,
    /// Project name; an empty string clears the tag.
    pub project: Option<String>,
}

/// Destination of a card move.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CardMove {
    /// Destination column id.
    pub column: String,
    /// Slot in the destination column; appended when absent.
    #[serde(deserialize_with = "position")]
    pub position: Option<i64>,
}

/// Fields accepted when creating a column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewColumn {
    /// Required, non-empty. The column id is derived from it.
    pub title: Option<String>,
    /// Slot among the columns; appended when absent.
    #[serde(deserialize_with = "position")]
    pub position: Option<i64>,
    /// Header colour.
    pub color: Option<String>,
}

/// Fields accepted when updating a column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnUpdate {
    /// New title. The id never changes.
    pub title: Option<String>,
    /// New slot among the columns.
    #[serde(deserialize_with = "position")]
    pub position: Option<i64>,
    /// New header colour.
    pub color: Option<String>,
}

/// Fields accepted when creating a project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewProject {
    /// Required, unique after trimming.
    pub name: Option<String>,
    /// Colour; a random unused one is picked when absent.
    pub color: Option<String>,
    /// Slot among the projects.
    #[serde(deserialize_with = "position")]
    pub position: Option<i64>,
}

/// Fields accepted when updating a project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectUpdate {
    /// New unique name; tagged cards follow the rename.
    pub name: Option<String>,
    /// New colour; tagged cards are recoloured.
    pub color: Option<String>,
    /// New slot among the projects.
    #[serde(deserialize_with = "position")]
    pub position: Option<i64>,
}

/// A position may arrive as an integer, a float (truncated) or a numeric
/// string.
#[allow(clippy::cast_possible_truncation)]
fn position<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid position: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid position: {s}"))),
        Some(other) => Err(D::Error::custom(format!("invalid position: {other}"))),
    }
}

// === Cards ===

/// Create a card and append it to its column.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] without a title and
/// [`Error::NotFound`] for an unknown column.
pub fn create_card(board: &mut Board, new: NewCard) -> Result<Card> {
    let title = new
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::invalid_input("title required"))?;
    let column_id = non_empty(new.column).unwrap_or_else(|| DEFAULT_COLUMN_ID.to_string());
    let column_idx = board
        .column_index(&column_id)
        .ok_or_else(Error::column_not_found)?;

    let mut card = Card {
        id: Uuid::new_v4().to_string(),
        title,
        description: new.description.unwrap_or_default(),
        links: new.links.as_ref().map(clean_links).unwrap_or_default(),
        color: DEFAULT_CARD_COLOR.to_string(),
        project: None,
        created_at: Some(Utc::now()),
    };

    let project_name = new.project.as_deref().map(str::trim).unwrap_or_default();
    if project_name.is_empty() {
        if let Some(color) = non_empty(new.color) {
            card.color = color;
        }
    } else {
        if let Some(color) = ensure_project(board, project_name) {
            card.color = color;
        }
        card.project = Some(project_name.to_string());
    }

    debug!(card_id = %card.id, column = %column_id, "created card");
    board.columns[column_idx].cards.push(card.clone());
    Ok(card)
}

/// Update a card's fields and optionally relocate it.
///
/// Without `column` the card keeps its slot. With `column` it is placed at
/// `position` in the destination, or appended.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown card or destination column.
pub fn update_card(board: &mut Board, card_id: &str, update: CardUpdate) -> Result<Card> {
    let (column_idx, slot) = locate_card(board, card_id).ok_or_else(Error::card_not_found)?;
    let target = non_empty(update.column);
    let destination_idx = match &target {
        Some(column_id) => board
            .column_index(column_id)
            .ok_or_else(Error::target_column_not_found)?,
        None => column_idx,
    };

    let mut card = board.columns[column_idx].cards.remove(slot);

    if let Some(title) = update.title {
        card.title = title;
    }
    if let Some(description) = update.description {
        card.description = description;
    }
    let color_given = update.color.is_some();
    if let Some(color) = update.color {
        card.color = color;
    }
    if let Some(project) = update.project {
        let project = project.trim();
        if project.is_empty() {
            card.project = None;
            if !color_given {
                card.color = DEFAULT_CARD_COLOR.to_string();
            }
        } else {
            if let Some(color) = ensure_project(board, project) {
                card.color = color;
            }
            card.project = Some(project.to_string());
        }
    }
    if let Some(links) = update.links {
        card.links = clean_links(&links);
    }

    // Tagged cards always wear their project's colour.
    if let Some(color) = card
        .project
        .as_deref()
        .and_then(|name| board.project(name))
        .and_then(|p| p.color.clone())
    {
        card.color = color;
    }

    let cards = &mut board.columns[destination_idx].cards;
    if target.is_some() {
        insert_at(cards, card.clone(), update.position);
    } else {
        let slot = slot.min(cards.len());
        cards.insert(slot, card.clone());
    }
    debug!(card_id, "updated card");
    Ok(card)
}

/// Move a card to another column, leaving every other field untouched.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown card or column.
pub fn move_card(board: &mut Board, card_id: &str, to: CardMove) -> Result<Card> {
    let (column_idx, slot) = locate_card(board, card_id).ok_or_else(Error::card_not_found)?;
    let destination_idx = board
        .column_index(&to.column)
        .ok_or_else(Error::target_column_not_found)?;

    let card = board.columns[column_idx].cards.remove(slot);
    insert_at(
        &mut board.columns[destination_idx].cards,
        card.clone(),
        to.position,
    );
    debug!(card_id, column = %to.column, "moved card");
    Ok(card)
}

/// Remove a card from the board.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no card has this id; the board is untouched.
pub fn delete_card(board: &mut Board, card_id: &str) -> Result<Card> {
    let (column_idx, slot) = locate_card(board, card_id).ok_or_else(Error::card_not_found)?;
    let card = board.columns[column_idx].cards.remove(slot);
    debug!(card_id, "deleted card");
    Ok(card)
}

// === Columns ===

/// Create a column whose id is a slug of its title.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] without a title.
pub fn create_column(board: &mut Board, new: NewColumn) -> Result<Column> {
    let title = new
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::invalid_input("title required"))?;

    let mut id = slugify(&title);
    if board.column(&id).is_some() {
        id = format!("{id}-{}", short_suffix());
    }

    let column = Column {
        id,
        title,
        color: Some(non_empty(new.color).unwrap_or_else(|| DEFAULT_COLUMN_COLOR.to_string())),
        cards: Vec::new(),
    };
    insert_at(&mut board.columns, column.clone(), new.position);
    debug!(column = %column.id, "created column");
    Ok(column)
}

/// Rename, recolour or reorder a column.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown column.
pub fn update_column(board: &mut Board, column_id: &str, update: ColumnUpdate) -> Result<Column> {
    let idx = board
        .column_index(column_id)
        .ok_or_else(Error::column_not_found)?;

    let column = &mut board.columns[idx];
    if let Some(title) = update.title {
        column.title = title;
    }
    if let Some(color) = update.color {
        column.color = Some(color);
    }
    let column = column.clone();

    if let Some(position) = update.position {
        reposition(&mut board.columns, idx, position);
    }
    Ok(column)
}

/// Remove a column. Its cards move to `move_to` when that column exists,
/// otherwise they are dropped with it.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown column.
pub fn delete_column(board: &mut Board, column_id: &str, move_to: Option<&str>) -> Result<Column> {
    let idx = board
        .column_index(column_id)
        .ok_or_else(Error::column_not_found)?;
    let mut column = board.columns.remove(idx);

    if let Some(target) = move_to
        .filter(|t| !t.is_empty())
        .and_then(|t| board.columns.iter_mut().find(|c| c.id == t))
    {
        debug!(from = column_id, to = %target.id, count = column.cards.len(), "rehomed cards");
        target.cards.append(&mut column.cards);
    }
    Ok(column)
}

// === Projects ===

/// Create a project.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for a blank or duplicate name.
pub fn create_project(board: &mut Board, new: NewProject) -> Result<Project> {
    let name = new.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(Error::invalid_input("name required"));
    }
    if board.project(name).is_some() {
        return Err(Error::invalid_input("project name must be unique"));
    }

    let color = non_empty(new.color).unwrap_or_else(|| unused_project_color(board));
    let project = Project {
        name: name.to_string(),
        color: Some(color),
    };
    insert_at(&mut board.projects, project.clone(), new.position);
    Ok(project)
}

/// Rename, recolour or reorder the project at `index`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an out-of-range index and
/// [`Error::InvalidInput`] for a blank or duplicate new name.
pub fn update_project(board: &mut Board, index: usize, update: ProjectUpdate) -> Result<Project> {
    if index >= board.projects.len() {
        return Err(Error::project_not_found());
    }

    if let Some(name) = update.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_input("name required"));
        }
        let taken = board
            .projects
            .iter()
            .enumerate()
            .any(|(i, p)| i != index && p.name == name);
        if taken {
            return Err(Error::invalid_input("project name must be unique"));
        }
        let old_name = board.projects[index].name.clone();
        if name != old_name {
            board.projects[index].name = name.to_string();
            let color = board.projects[index].color.clone();
            retag_cards(board, &old_name, Some(name), color.as_deref());
        }
    }

    if let Some(color) = update.color {
        let color = Some(color).filter(|c| !c.is_empty());
        board.projects[index].color.clone_from(&color);
        let name = board.projects[index].name.clone();
        recolor_cards(board, &name, color.as_deref());
    }

    let project = board.projects[index].clone();
    if let Some(position) = update.position {
        reposition(&mut board.projects, index, position);
    }
    Ok(project)
}

/// Remove the project at `index`; its cards lose the tag and colour.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an out-of-range index.
pub fn delete_project(board: &mut Board, index: usize) -> Result<Project> {
    if index >= board.projects.len() {
        return Err(Error::project_not_found());
    }
    let project = board.projects.remove(index);
    retag_cards(board, &project.name, None, None);
    Ok(project)
}

// === Helpers ===

/// Column index and slot of a card.
fn locate_card(board: &Board, card_id: &str) -> Option<(usize, usize)> {
    board.columns.iter().enumerate().find_map(|(col_idx, col)| {
        col.cards
            .iter()
            .position(|c| c.id == card_id)
            .map(|slot| (col_idx, slot))
    })
}

/// Insert at `position`, appending when absent or past the end. Negative
/// positions clamp to the front.
fn insert_at<T>(items: &mut Vec<T>, item: T, position: Option<i64>) {
    match position.map(|p| usize::try_from(p.max(0)).unwrap_or(usize::MAX)) {
        Some(pos) if pos < items.len() => items.insert(pos, item),
        _ => items.push(item),
    }
}

/// Move the item at `from` to `position`, clamped to the list bounds.
fn reposition<T>(items: &mut Vec<T>, from: usize, position: i64) {
    let item = items.remove(from);
    let pos = usize::try_from(position.max(0))
        .unwrap_or(usize::MAX)
        .min(items.len());
    items.insert(pos, item);
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Lowercase the title and collapse non-alphanumeric runs into `-`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let slug = SLUG_SEPARATORS.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        slug.to_string()
    }
}

fn short_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Keep link objects with a non-blank, safe URL; blank text falls back to the
/// URL.
#[must_use]
pub fn clean_links(raw: &Value) -> Vec<Link> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let text = field_text(item.get("text"));
            let url = field_text(item.get("url"));
            if url.is_empty() || !is_safe_url(&url) {
                return None;
            }
            Some(Link {
                text: if text.is_empty() { url.clone() } else { text },
                url,
            })
        })
        .collect()
}

/// Relative URLs and `http`, `https` or `mailto` URLs only.
fn is_safe_url(url: &str) -> bool {
    if url.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return false;
    }
    let scheme_end = url.find(':');
    let path_start = url.find(|c: char| matches!(c, '/' | '?' | '#'));
    match (scheme_end, path_start) {
        (Some(colon), Some(slash)) if slash < colon => true,
        (Some(colon), _) => SAFE_SCHEMES
            .iter()
            .any(|scheme| url[..colon].eq_ignore_ascii_case(scheme)),
        (None, _) => true,
    }
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Return the colour of the named project, creating the project if needed.
fn ensure_project(board: &mut Board, name: &str) -> Option<String> {
    if let Some(existing) = board.projects.iter_mut().find(|p| p.name == name) {
        let color = existing
            .color
            .get_or_insert_with(|| DEFAULT_CARD_COLOR.to_string());
        return Some(color.clone());
    }
    let color = unused_project_color(board);
    board.projects.push(Project {
        name: name.to_string(),
        color: Some(color.clone()),
    });
    Some(color)
}

/// A random `#rrggbb` colour, avoiding colours other projects already use.
fn unused_project_color(board: &Board) -> String {
    let existing: HashSet<String> = board
        .projects
        .iter()
        .filter_map(|p| p.color.as_deref())
        .map(str::to_lowercase)
        .collect();
    let mut rng = rand::thread_rng();
    let mut color = random_color(&mut rng);
    for _ in 1..COLOR_ATTEMPTS {
        if !existing.contains(&color) {
            break;
        }
        color = random_color(&mut rng);
    }
    color
}

fn random_color(rng: &mut impl Rng) -> String {
    format!("#{:06x}", rng.gen_range(0..=0x00ff_ffff_u32))
}

fn recolor_cards(board: &mut Board, project: &str, color: Option<&str>) {
    let color = color.unwrap_or(DEFAULT_CARD_COLOR);
    for card in board
        .columns
        .iter_mut()
        .flat_map(|c| c.cards.iter_mut())
        .filter(|c| c.project.as_deref() == Some(project))
    {
        card.color = color.to_string();
    }
}

/// Point cards tagged `old` at `new`, or untag them when `new` is `None`.
fn retag_cards(board: &mut Board, old: &str, new: Option<&str>, color: Option<&str>) {
    for card in board
        .columns
        .iter_mut()
        .flat_map(|c| c.cards.iter_mut())
        .filter(|c| c.project.as_deref() == Some(old))
    {
        if let Some(new) = new {
            card.project = Some(new.to_string());
            if let Some(color) = color {
                card.color = color.to_string();
            }
        } else {
            card.project = None;
            card.color = DEFAULT_CARD_COLOR.to_string();
        }
    }
}
