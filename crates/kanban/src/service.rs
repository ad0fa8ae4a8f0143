//! Request-level board operations.
//!
//! Each mutating call loads the whole board from the store, applies one
//! [`crate::board`] operation and saves the whole board back. A failed
//! operation saves nothing. Mutations inside this process are serialised; no
//! coordination exists with other processes sharing the same store.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::board::{
    self, CardMove, CardUpdate, ColumnUpdate, NewCard, NewColumn, NewProject, ProjectUpdate,
};
use crate::error::Result;
use crate::model::{Board, Card, Column, ColumnSummary, Project};
use crate::storage::BoardStore;

/// Board operations over a [`BoardStore`].
#[derive(Debug, Clone)]
pub struct BoardService {
    store: Arc<dyn BoardStore>,
    write_lock: Arc<Mutex<()>>,
}

impl BoardService {
    /// Create a service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn BoardStore> {
        &self.store
    }

    /// Load, apply `op`, and persist only if `op` succeeded.
    async fn mutate<T>(&self, op: impl FnOnce(&mut Board) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let mut board = self.store.load().await?;
        let value = op(&mut board)?;
        self.store.save(&board).await?;
        Ok(value)
    }

    /// The full board.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn board(&self) -> Result<Board> {
        self.store.load().await
    }

    /// Create a card.
    ///
    /// # Errors
    ///
    /// See [`board::create_card`]; store failures are passed through.
    pub async fn create_card(&self, new: NewCard) -> Result<Card> {
        let card = self.mutate(|b| board::create_card(b, new)).await?;
        info!(card_id = %card.id, "card created");
        Ok(card)
    }

    /// Update a card.
    ///
    /// # Errors
    ///
    /// See [`board::update_card`]; store failures are passed through.
    pub async fn update_card(&self, card_id: &str, update: CardUpdate) -> Result<Card> {
        self.mutate(|b| board::update_card(b, card_id, update)).await
    }

    /// Move a card to another column.
    ///
    /// # Errors
    ///
    /// See [`board::move_card`]; store failures are passed through.
    pub async fn move_card(&self, card_id: &str, to: CardMove) -> Result<Card> {
        let column = to.column.clone();
        let card = self.mutate(|b| board::move_card(b, card_id, to)).await?;
        info!(card_id, column = %column, "card moved");
        Ok(card)
    }

    /// Delete a card.
    ///
    /// # Errors
    ///
    /// See [`board::delete_card`]; store failures are passed through.
    pub async fn delete_card(&self, card_id: &str) -> Result<Card> {
        let card = self.mutate(|b| board::delete_card(b, card_id)).await?;
        info!(card_id, "card deleted");
        Ok(card)
    }

    /// Column metadata without cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn columns(&self) -> Result<Vec<ColumnSummary>> {
        Ok(self.store.load().await?.column_summaries())
    }

    /// Create a column.
    ///
    /// # Errors
    ///
    /// See [`board::create_column`]; store failures are passed through.
    pub async fn create_column(&self, new: NewColumn) -> Result<Column> {
        self.mutate(|b| board::create_column(b, new)).await
    }

    /// Update a column.
    ///
    /// # Errors
    ///
    /// See [`board::update_column`]; store failures are passed through.
    pub async fn update_column(&self, column_id: &str, update: ColumnUpdate) -> Result<Column> {
        self.mutate(|b| board::update_column(b, column_id, update))
            .await
    }

    /// Delete a column, optionally moving its cards.
    ///
    /// # Errors
    ///
    /// See [`board::delete_column`]; store failures are passed through.
    pub async fn delete_column(&self, column_id: &str, move_to: Option<&str>) -> Result<Column> {
        self.mutate(|b| board::delete_column(b, column_id, move_to))
            .await
    }

    /// All projects.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn projects(&self) -> Result<Vec<Project>> {
        Ok(self.store.load().await?.projects)
    }

    /// Create a project.
    ///
    /// # Errors
    ///
    /// See [`board::create_project`]; store failures are passed through.
    pub async fn create_project(&self, new: NewProject) -> Result<Project> {
        self.mutate(|b| board::create_project(b, new)).await
    }

    /// Update the project at `index`.
    ///
    /// # Errors
    ///
    /// See [`board::update_project`]; store failures are passed through.
    pub async fn update_project(&self, index: usize, update: ProjectUpdate) -> Result<Project> {
        self.mutate(|b| board::update_project(b, index, update))
            .await
    }

    /// Delete the project at `index`.
    ///
    /// # Errors
    ///
    /// See [`board::delete_project`]; store failures are passed through.
    pub async fn delete_project(&self, index: usize) -> Result<Project> {
        self.mutate(|b| board::delete_project(b, index)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, SqliteStore};
    use std::time::Duration;

    fn json_service(dir: &std::path::Path) -> BoardService {
        let store = JsonFileStore::new(dir.join("kanban.json"), Duration::from_millis(500));
        BoardService::new(Arc::new(store))
    }

    fn titled(title: &str, column: &str) -> NewCard {
        NewCard {
            title: Some(title.to_string()),
            column: Some(column.to_string()),
            ..NewCard::default()
        }
    }

    #[tokio::test]
    async fn test_create_card_persists() {
        let dir = tempfile::tempdir().unwrap();
        let service = json_service(dir.path());

        let card = service.create_card(titled("Fix bug", "todo")).await.unwrap();

        let board = service.board().await.unwrap();
        assert_eq!(board.card_count(), 1);
        assert_eq!(board.column_of(&card.id), Some("todo"));
    }

    #[tokio::test]
    async fn test_move_fix_bug_to_done() {
        let dir = tempfile::tempdir().unwrap();
        let service = json_service(dir.path());
        let card = service.create_card(titled("Fix bug", "todo")).await.unwrap();

        service
            .move_card(
                &card.id,
                CardMove {
                    column: "done".to_string(),
                    position: None,
                },
            )
            .await
            .unwrap();

        let board = service.board().await.unwrap();
        assert_eq!(board.column_of(&card.id), Some("done"));
        assert_eq!(board.card(&card.id), Some(&card));
    }

    #[tokio::test]
    async fn test_failed_operation_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let service = json_service(dir.path());
        service.create_card(titled("Fix bug", "todo")).await.unwrap();
        let path = dir.path().join("kanban.json");
        let before = std::fs::read(&path).unwrap();

        assert!(service.delete_card("missing").await.unwrap_err().is_not_found());
        assert!(service
            .create_card(titled("Nowhere", "later"))
            .await
            .is_err());

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_all_kept() {
        let dir = tempfile::tempdir().unwrap();
        let service = json_service(dir.path());

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .create_card(titled(&format!("card {i}"), "todo"))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(service.board().await.unwrap().card_count(), 8);
    }

    #[tokio::test]
    async fn test_columns_and_projects_over_sqlite() {
        let service = BoardService::new(Arc::new(SqliteStore::open_in_memory().unwrap()));

        service
            .create_column(NewColumn {
                title: Some("Review".to_string()),
                ..NewColumn::default()
            })
            .await
            .unwrap();
        service
            .create_project(NewProject {
                name: Some("Ops".to_string()),
                ..NewProject::default()
            })
            .await
            .unwrap();

        let columns = service.columns().await.unwrap();
        assert_eq!(columns.last().map(|c| c.id.as_str()), Some("review"));
        assert_eq!(service.projects().await.unwrap().len(), 1);

        service.delete_project(0).await.unwrap();
        service.delete_column("review", None).await.unwrap();
        assert!(service.projects().await.unwrap().is_empty());
        assert_eq!(service.columns().await.unwrap().len(), 4);
    }
}
