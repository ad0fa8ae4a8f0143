//! JSON file backend.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, warn};

use super::{warn_if_slow, BoardStore};
use crate::config::StorageBackend;
use crate::error::{Error, Result};
use crate::model::Board;

/// Board stored as a single JSON file.
///
/// Saves write `<file>.tmp` and rename it over the data file. When the rename
/// is refused with a cross-device, busy or permission error the temporary
/// file is copied over the target instead.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    slow_io: Duration,
}

impl JsonFileStore {
    /// Create a store for the file at `path`. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, slow_io: Duration) -> Self {
        Self {
            path: path.into(),
            slow_io,
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn write_document(&self, board: &Board) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(board)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, &bytes)
            .await
            .map_err(|source| Error::BoardWrite {
                path: tmp.clone(),
                source,
            })?;
        replace(&tmp, &self.path)
            .await
            .map_err(|source| Error::BoardWrite {
                path: self.path.clone(),
                source,
            })
    }
}

#[async_trait]
impl BoardStore for JsonFileStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Json
    }

    fn location(&self) -> &Path {
        &self.path
    }

    async fn ensure(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        let exists = fs::try_exists(&self.path)
            .await
            .map_err(|source| Error::BoardRead {
                path: self.path.clone(),
                source,
            })?;
        if !exists {
            info!("Creating new blank kanban board at {}", self.path.display());
            self.write_document(&Board::starter()).await?;
        }
        Ok(())
    }

    async fn load(&self) -> Result<Board> {
        self.ensure().await?;
        let start = Instant::now();
        let bytes = fs::read(&self.path)
            .await
            .map_err(|source| Error::BoardRead {
                path: self.path.clone(),
                source,
            })?;
        let board: Board =
            serde_json::from_slice(&bytes).map_err(|source| Error::BoardCorrupt {
                path: self.path.clone(),
                source,
            })?;
        warn_if_slow("load", start.elapsed(), self.slow_io);
        debug!(cards = board.card_count(), "loaded board");
        Ok(board)
    }

    async fn save(&self, board: &Board) -> Result<()> {
        let start = Instant::now();
        self.write_document(board).await?;
        warn_if_slow("save", start.elapsed(), self.slow_io);
        debug!(cards = board.card_count(), "saved board");
        Ok(())
    }
}

/// Rename `tmp` over `target`, copying when the rename is refused.
async fn replace(tmp: &Path, target: &Path) -> std::io::Result<()> {
    match fs::rename(tmp, target).await {
        Ok(()) => Ok(()),
        Err(err) if is_recoverable(&err) => {
            warn!("rename of {} refused ({err}), copying instead", tmp.display());
            fs::copy(tmp, target).await?;
            fs::remove_file(tmp).await
        }
        Err(err) => {
            let _ = fs::remove_file(tmp).await;
            Err(err)
        }
    }
}

fn is_recoverable(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::CrossesDevices | ErrorKind::ResourceBusy | ErrorKind::PermissionDenied
    )
}
