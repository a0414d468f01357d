// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folio - an authors and books catalog with a transactional outbox.
//!
//! This is the binary entry point: catalog commands run against the
//! configured database, `serve` runs the outbox dispatcher.

mod catalog;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_config::FolioConfig;
use folio_core::FolioError;
use folio_library::Library;
use folio_storage::Database;

/// Folio - an authors and books catalog with a transactional outbox.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the outbox dispatcher until SIGINT or SIGTERM.
    Serve,
    /// Manage authors.
    #[command(subcommand)]
    Author(AuthorCommand),
    /// Manage books.
    #[command(subcommand)]
    Book(BookCommand),
    /// Inspect the outbox.
    #[command(subcommand)]
    Outbox(OutboxCommand),
}

#[derive(Subcommand, Debug)]
pub(crate) enum AuthorCommand {
    /// Register a new author.
    Register { name: String },
    /// Show an author.
    Show { id: String },
    /// Change an author's name.
    Rename { id: String, name: String },
    /// List an author's books.
    Books { id: String },
}

#[derive(Subcommand, Debug)]
pub(crate) enum BookCommand {
    /// Add a book.
    Add {
        name: String,
        /// Author id; repeat for co-authors.
        #[arg(long = "author", value_name = "ID")]
        authors: Vec<String>,
    },
    /// Show a book.
    Show { id: String },
    /// Replace a book's name and authors.
    Update {
        id: String,
        name: String,
        /// Author id; repeat for co-authors.
        #[arg(long = "author", value_name = "ID")]
        authors: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum OutboxCommand {
    /// Message counts per status.
    Stats {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => folio_config::load_and_validate_path(path),
        None => folio_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            folio_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.log.level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: FolioConfig) -> Result<(), FolioError> {
    let (db, output) = match command {
        Commands::Serve => return serve::run_serve(config).await,
        Commands::Author(cmd) => {
            let (db, library) = open_library(&config).await?;
            (db, catalog::run_author(&library, cmd).await)
        }
        Commands::Book(cmd) => {
            let (db, library) = open_library(&config).await?;
            (db, catalog::run_book(&library, cmd).await)
        }
        Commands::Outbox(cmd) => {
            let (db, library) = open_library(&config).await?;
            (db, catalog::run_outbox(&library, cmd).await)
        }
    };
    db.close().await?;

    println!("{}", output?);
    Ok(())
}

async fn open_library(config: &FolioConfig) -> Result<(Database, Library), FolioError> {
    let db = Database::from_config(&config.storage).await?;
    Ok((db.clone(), Library::new(db)))
}
