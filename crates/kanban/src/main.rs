//! `kanban` - CLI for the Kanban board
//!
//! This binary runs the web server and offers a few commands for inspecting
//! the board and the configuration from a terminal.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use kanban::cli::{BoardCommand, Cli, Command, ConfigCommand, ServeCommand};
use kanban::storage::open_store;
use kanban::{init_logging, server, Board, Config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(&mut config, &serve_cmd),
        Command::Board(board_cmd) => handle_board(&config, &board_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn handle_serve(config: &mut Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    cmd.apply(config);
    config.validate()?;
    let runtime = server::runtime(config).context("failed to start async runtime")?;
    runtime.block_on(server::serve(config))?;
    Ok(())
}

fn handle_board(config: &Config, cmd: &BoardCommand) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let (location, board) = runtime.block_on(async {
        let store = open_store(config).await?;
        let board = store.load().await?;
        Ok::<_, kanban::Error>((store.location().to_path_buf(), board))
    })?;

    match cmd {
        BoardCommand::Show { json: true } => {
            println!("{}", serde_json::to_string_pretty(&board)?);
        }
        BoardCommand::Show { json: false } => print_board(&board),
        BoardCommand::Init => {
            println!("Board ready at {}", location.display());
            println!(
                "{} columns, {} cards",
                board.columns.len(),
                board.card_count()
            );
        }
    }
    Ok(())
}

fn print_board(board: &Board) {
    for column in &board.columns {
        println!("{} [{}] ({})", column.title, column.id, column.cards.len());
        for card in &column.cards {
            let short_id: String = card.id.chars().take(8).collect();
            match &card.project {
                Some(project) => println!("  {short_id}  {}  ({project})", card.title),
                None => println!("  {short_id}  {}", card.title),
            }
        }
    }
    if !board.projects.is_empty() {
        println!();
        println!("Projects:");
        for project in &board.projects {
            println!(
                "  {} {}",
                project.name,
                project.color.as_deref().unwrap_or("")
            );
        }
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!("  Workers:            {}", config.server.workers);
                println!(
                    "  Request timeout:    {}s",
                    config.server.request_timeout_secs
                );
                println!("  Max body bytes:     {}", config.server.max_body_bytes);
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Data directory:     {}", config.data_dir().display());
                println!("  Board file:         {}", config.board_path().display());
                println!("  Database:           {}", config.database_path().display());
                println!("  Slow I/O warning:   {}ms", config.storage.slow_io_warn_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
