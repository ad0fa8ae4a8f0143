//! Board data model.
//!
//! The board document is an ordered list of columns, each holding an ordered
//! list of cards, plus an ordered list of projects. This is exactly the shape
//! persisted to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Colour given to cards with no explicit or project colour.
pub const DEFAULT_CARD_COLOR: &str = "#5b2e8a";

/// Colour given to new columns created without one.
pub const DEFAULT_COLUMN_COLOR: &str = "#9aa0a6";

/// Column that new cards land in when none is requested.
pub const DEFAULT_COLUMN_ID: &str = "todo";

/// A hyperlink attached to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link label; falls back to the URL when blank.
    pub text: String,
    /// Link target.
    pub url: String,
}

/// A unit of work tracked on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Short title, always non-empty for cards created through the API.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Attached links.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Display colour, `#rrggbb`.
    #[serde(default = "default_card_color")]
    pub color: String,
    /// Name of the project this card is tagged with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// When the card was created. Absent for cards from older boards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_card_color() -> String {
    DEFAULT_CARD_COLOR.to_string()
}

/// A named status bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Slug identifier, unique on the board.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Header colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Cards in display order.
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    fn new(id: &str, title: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            color: Some(color.to_string()),
            cards: Vec::new(),
        }
    }

    /// The column without its cards.
    #[must_use]
    pub fn summary(&self) -> ColumnSummary {
        ColumnSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            color: self.color.clone(),
        }
    }
}

/// Column metadata as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Column id.
    pub id: String,
    /// Column title.
    pub title: String,
    /// Column colour.
    pub color: Option<String>,
}

/// A named, coloured tag shared by cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project name.
    pub name: String,
    /// Colour applied to tagged cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// The full board document.
///
/// Missing `columns` or `projects` keys deserialize as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Board {
    /// Columns in display order.
    pub columns: Vec<Column>,
    /// Projects in display order.
    pub projects: Vec<Project>,
}

impl Board {
    /// The board written to a fresh data file.
    #[must_use]
    pub fn starter() -> Self {
        Self {
            columns: vec![
                Column::new("todo", "To Do", "#1f77b4"),
                Column::new("inprogress", "In Progress", "#ff8c00"),
                Column::new("blocked", "Blocked", "#d62728"),
                Column::new("done", "Done", "#2ca02c"),
            ],
            projects: Vec::new(),
        }
    }

    /// Total number of cards across all columns.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }

    /// Iterate over every card on the board in display order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.columns.iter().flat_map(|c| c.cards.iter())
    }

    /// Look up a card by id.
    #[must_use]
    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards().find(|c| c.id == card_id)
    }

    /// Id of the column holding the given card.
    #[must_use]
    pub fn column_of(&self, card_id: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|col| col.cards.iter().any(|c| c.id == card_id))
            .map(|col| col.id.as_str())
    }

    /// Look up a column by id.
    #[must_use]
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    /// Index of the column with the given id.
    #[must_use]
    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    /// Look up a project by name.
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Metadata for every column, without cards.
    #[must_use]
    pub fn column_summaries(&self) -> Vec<ColumnSummary> {
        self.columns.iter().map(Column::summary).collect()
    }
}
