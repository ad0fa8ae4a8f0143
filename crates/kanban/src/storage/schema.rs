//! `SQLite` schema for the board database.

/// The boards table, created on open if missing.
///
/// Holds a single row (`id = 1`) with the whole board document.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS boards (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    document TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Read the board document.
pub const SELECT_BOARD: &str = "SELECT document FROM boards WHERE id = 1";

/// Insert or replace the board document.
pub const UPSERT_BOARD: &str = r"
INSERT INTO boards (id, document, updated_at) VALUES (1, ?1, ?2)
ON CONFLICT(id) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at
";
