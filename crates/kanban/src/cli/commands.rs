//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::StorageBackend;

/// Serve command arguments.
#[derive(Debug, Default, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the board (overrides storage.data_dir)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage backend (overrides storage.backend)
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendArg>,
}

/// Board inspection commands.
#[derive(Debug, Subcommand)]
pub enum BoardCommand {
    /// Print the board
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Create the data file with the starter board if it does not exist
    Init,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Storage backend argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Pretty-printed JSON file
    Json,
    /// Embedded `SQLite` database
    Sqlite,
}

impl From<BackendArg> for StorageBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Json => Self::Json,
            BackendArg::Sqlite => Self::Sqlite,
        }
    }
}
