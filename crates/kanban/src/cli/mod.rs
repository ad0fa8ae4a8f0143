//! Command-line interface for kanban.
//!
//! This module provides the CLI structure for the `kanban` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{BackendArg, BoardCommand, ConfigCommand, ServeCommand};

use crate::config::Config;

/// kanban - A single-user Kanban board
///
/// Serves a board of columns and cards over HTTP, as a web page and a JSON
/// API, and keeps it in a single JSON file.
#[derive(Debug, Parser)]
#[command(name = "kanban")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeCommand),

    /// Inspect or initialise the board
    #[command(subcommand)]
    Board(BoardCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

impl ServeCommand {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = Some(dir.clone());
        }
        if let Some(backend) = self.backend {
            config.storage.backend = backend.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Board(BoardCommand::Show { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "kanban");
    }

    #[test]
    fn test_verbosity_quiet() {
        assert_eq!(cli_with(0, true).verbosity(), crate::logging::Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        assert_eq!(
            cli_with(0, false).verbosity(),
            crate::logging::Verbosity::Normal
        );
    }

    #[test]
    fn test_verbosity_verbose() {
        assert_eq!(
            cli_with(1, false).verbosity(),
            crate::logging::Verbosity::Verbose
        );
    }

    #[test]
    fn test_verbosity_trace() {
        assert_eq!(
            cli_with(2, false).verbosity(),
            crate::logging::Verbosity::Trace
        );
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let args = vec!["kanban", "serve", "--host", "127.0.0.1", "-p", "8080"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Serve(serve) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(serve.port, Some(8080));
    }

    #[test]
    fn test_parse_board_show_json() {
        let args = vec!["kanban", "board", "show", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Board(BoardCommand::Show { json: true })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["kanban", "-c", "/custom/config.toml", "board", "init"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let args = vec!["kanban", "-v", "serve"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_serve_overrides_config() {
        let args = vec![
            "kanban", "serve", "--port", "9000", "--data-dir", "/srv/board", "-b", "sqlite",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Serve(serve) = cli.command else {
            panic!("expected serve");
        };

        let mut config = Config::default();
        serve.apply(&mut config);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.data_dir(), PathBuf::from("/srv/board"));
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    }
}
