//! `kanban` - A minimal single-user Kanban board
//!
//! This library provides the board model and its operations, whole-document
//! persistence to a JSON file (or an embedded `SQLite` database), and the
//! HTTP surface that serves the board as a web page and a JSON API.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod model;
pub mod server;
pub mod service;
pub mod storage;

pub use config::{Config, StorageBackend};
pub use error::{Error, Result};
pub use http::{build_router, AppState};
pub use logging::init_logging;
pub use model::{Board, Card, Column, Link, Project};
pub use service::BoardService;
pub use storage::{open_store, BoardStore, JsonFileStore, SqliteStore};
