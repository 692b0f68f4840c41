//! # shopsync CLI
//!
//! ## Usage
//!
//! ```bash
//! shopsync --config ./config/shopsync.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `shopsync init [--reset]` | Create the SQLite database and run schema migrations |
//! | `shopsync ingest <target>` | Mirror `users`, `carts`, `products` or `all` from upstream |
//! | `shopsync categories` | Print each user's most-ordered categories |
//! | `shopsync serve [--skip-ingest]` | Ingest everything, then start the JSON HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use shopsync::{categories, config, ingest, logging, migrate, server};

/// shopsync: mirror a paginated e-commerce API into SQLite and serve it.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/shopsync.example.toml` for a full example.
#[derive(Parser)]
#[command(name = "shopsync", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/shopsync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent unless `--reset` is given.
    Init {
        /// Drop all tables before recreating them.
        #[arg(long)]
        reset: bool,
    },

    /// Ingest records from the upstream service.
    ///
    /// Records already present (same email, product id or cart id) are
    /// skipped, so re-running is safe.
    Ingest {
        /// `users`, `carts`, `products`, or `all` (users, carts, products in that order).
        target: String,
    },

    /// Print the most-ordered category (ties included) for every user with carts.
    Categories,

    /// Start the read-only HTTP server.
    Serve {
        /// Serve the existing store without ingesting first.
        #[arg(long)]
        skip_ingest: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init { reset } => {
            migrate::run_migrations(&cfg, reset).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest { target } => {
            let collections = ingest::parse_target(&target)?;
            ingest::run_ingest(&cfg, &collections).await?;
        }
        Commands::Categories => {
            categories::run_categories(&cfg).await?;
        }
        Commands::Serve { skip_ingest } => {
            server::run_server(&cfg, skip_ingest).await?;
        }
    }

    Ok(())
}
