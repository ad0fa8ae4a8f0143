//! Embedded `SQLite` backend.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use super::schema::{SCHEMA, SELECT_BOARD, UPSERT_BOARD};
use super::BoardStore;
use crate::config::StorageBackend;
use crate::error::{Error, Result};
use crate::model::Board;

/// Board stored as one JSON document in a `SQLite` database.
///
/// Each save replaces the document inside a transaction, so a crash mid-write
/// leaves the previous board intact.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a board database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &Path) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| Error::internal("database connection lock poisoned"))?;
            f(&mut guard, &path)
        })
        .await
        .map_err(|e| Error::internal(format!("database task failed: {e}")))?
    }
}

fn read_board(conn: &Connection, path: &Path) -> Result<Option<Board>> {
    let document: Option<String> = conn
        .query_row(SELECT_BOARD, [], |row| row.get(0))
        .optional()?;
    document
        .map(|doc| {
            serde_json::from_str(&doc).map_err(|source| Error::BoardCorrupt {
                path: path.to_path_buf(),
                source,
            })
        })
        .transpose()
}

fn write_board(conn: &mut Connection, board: &Board) -> Result<()> {
    let document = serde_json::to_string(board)?;
    let tx = conn.transaction()?;
    tx.execute(UPSERT_BOARD, (document, Utc::now().to_rfc3339()))?;
    tx.commit()?;
    Ok(())
}

#[async_trait]
impl BoardStore for SqliteStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Sqlite
    }

    fn location(&self) -> &Path {
        &self.path
    }

    async fn ensure(&self) -> Result<()> {
        self.with_conn(|conn, path| {
            if read_board(conn, path)?.is_none() {
                info!("Creating new blank kanban board in {}", path.display());
                write_board(conn, &Board::starter())?;
            }
            Ok(())
        })
        .await
    }

    async fn load(&self) -> Result<Board> {
        self.with_conn(|conn, path| match read_board(conn, path)? {
            Some(board) => Ok(board),
            None => {
                let board = Board::starter();
                write_board(conn, &board)?;
                Ok(board)
            }
        })
        .await
    }

    async fn save(&self, board: &Board) -> Result<()> {
        let board = board.clone();
        self.with_conn(move |conn, _| write_board(conn, &board)).await?;
        debug!("saved board to database");
        Ok(())
    }
}
