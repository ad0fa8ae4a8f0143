//! Storage layer for kanban.
//!
//! A store holds exactly one board document and always reads and writes it
//! whole. Two backends implement [`BoardStore`]:
//!
//! - [`JsonFileStore`]: a pretty-printed JSON file, replaced atomically on save
//! - [`SqliteStore`]: the same document in an embedded `SQLite` database,
//!   written in a transaction

mod json;
pub mod schema;
mod sqlite;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::model::Board;

pub use json::JsonFileStore;
pub use sqlite::SqliteStore;

/// Whole-document persistence for the board.
#[async_trait]
pub trait BoardStore: Send + Sync + std::fmt::Debug {
    /// Which backend this is.
    fn backend(&self) -> StorageBackend;

    /// Where the document lives.
    fn location(&self) -> &Path;

    /// Create the store with the starter board if it holds nothing yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be created or written.
    async fn ensure(&self) -> Result<()>;

    /// Read the full board, creating the starter board first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or is corrupt.
    async fn load(&self) -> Result<Board>;

    /// Overwrite the stored document with `board`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    async fn save(&self, board: &Board) -> Result<()>;
}

/// Open the store selected by the configuration and make sure it holds a board.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or initialised.
pub async fn open_store(config: &Config) -> Result<Arc<dyn BoardStore>> {
    let store: Arc<dyn BoardStore> = match config.storage.backend {
        StorageBackend::Json => Arc::new(JsonFileStore::new(
            config.board_path(),
            config.slow_io_threshold(),
        )),
        StorageBackend::Sqlite => Arc::new(SqliteStore::open(config.database_path())?),
    };
    store.ensure().await?;
    info!(
        backend = %store.backend(),
        location = %store.location().display(),
        "board store ready"
    );
    Ok(store)
}

/// Warn when a store operation exceeded the threshold.
fn warn_if_slow(operation: &str, elapsed: Duration, threshold: Duration) {
    if elapsed > threshold {
        warn!("Slow {}: {:.3}s", operation, elapsed.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path, backend: StorageBackend) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = Some(dir.to_path_buf());
        config.storage.backend = backend;
        config
    }

    #[tokio::test]
    async fn test_open_json_store_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), StorageBackend::Json);

        let store = open_store(&config).await.unwrap();

        assert_eq!(store.backend(), StorageBackend::Json);
        assert_eq!(store.location(), config.board_path());
        assert!(config.board_path().exists());
        assert_eq!(store.load().await.unwrap(), Board::starter());
    }

    #[tokio::test]
    async fn test_open_sqlite_store_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), StorageBackend::Sqlite);

        let store = open_store(&config).await.unwrap();

        assert_eq!(store.backend(), StorageBackend::Sqlite);
        assert!(config.database_path().exists());
        assert_eq!(store.load().await.unwrap(), Board::starter());
    }

    #[test]
    fn test_warn_if_slow_does_not_panic() {
        crate::logging::init_test_logging();
        warn_if_slow("load", Duration::from_secs(1), Duration::from_millis(500));
        warn_if_slow("save", Duration::ZERO, Duration::from_millis(500));
    }
}
