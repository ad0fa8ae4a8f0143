//! Error types for kanban.
//!
//! This module defines all error types used throughout the kanban crate,
//! providing detailed context for debugging and user-facing messages that are
//! returned verbatim in HTTP error bodies.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for kanban operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Board Errors ===
    /// A card, column or project could not be found.
    #[error("{message}")]
    NotFound {
        /// The kind of entity that was looked up.
        kind: &'static str,
        /// The message returned to the client.
        message: String,
    },

    /// The request was missing a required field or carried an invalid value.
    #[error("{0}")]
    InvalidInput(String),

    /// The request body exceeded the configured limit.
    #[error("{0}")]
    BodyTooLarge(String),

    // === Data File Errors ===
    /// The board document could not be read.
    #[error("failed to read board at {path}: {source}")]
    BoardRead {
        /// Path to the board file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The board document exists but is not valid JSON for a board.
    #[error("board at {path} is corrupt: {source}")]
    BoardCorrupt {
        /// Path to the board file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The board document could not be written.
    #[error("failed to write board at {path}: {source}")]
    BoardWrite {
        /// Path to the board file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Database Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Presentation Errors ===
    /// An HTML template failed to render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    // === I/O Errors ===
    /// File system or socket operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for kanban operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for a card.
    #[must_use]
    pub fn card_not_found() -> Self {
        Self::NotFound {
            kind: "card",
            message: "card not found".to_string(),
        }
    }

    /// Create a not-found error for a column.
    #[must_use]
    pub fn column_not_found() -> Self {
        Self::NotFound {
            kind: "column",
            message: "column not found".to_string(),
        }
    }

    /// Create a not-found error for the destination column of a move.
    #[must_use]
    pub fn target_column_not_found() -> Self {
        Self::NotFound {
            kind: "column",
            message: "target column not found".to_string(),
        }
    }

    /// Create a not-found error for a project.
    #[must_use]
    pub fn project_not_found() -> Self {
        Self::NotFound {
            kind: "project",
            message: "project not found".to_string(),
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the requested entity does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The kind of entity a not-found error refers to.
    #[must_use]
    pub fn not_found_kind(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Check if this error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::InvalidInput(_) | Self::BodyTooLarge(_)
        )
    }
}
