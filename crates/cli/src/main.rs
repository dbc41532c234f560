//! Drip Supply CLI - catalog checks and cart maintenance.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog the storefront would serve
//! drip-cli catalog list
//!
//! # Validate a catalog file
//! drip-cli catalog validate catalog.json
//!
//! # Inspect or empty the persisted cart
//! drip-cli cart show
//! drip-cli cart clear --yes
//! ```
//!
//! `--data-dir` and `--path` default to `STOREFRONT_DATA_DIR` and
//! `STOREFRONT_CATALOG_PATH` (a `.env` file is honored).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use drip_storefront::config::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "drip-cli")]
#[command(author, version, about = "Drip Supply storefront tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect product catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect or reset the persisted cart
    Cart {
        /// Storefront data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Catalog file (default: the configured or embedded catalog)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Validate a catalog file
    Validate {
        /// Catalog file to check
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print cart lines and totals
    Show,
    /// Remove every line
    Clear {
        /// Confirm the operation
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drip_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List { path } => {
                let path = path.or(config.catalog_path);
                commands::catalog::list(path.as_deref(), &mut out)?;
            }
            CatalogAction::Validate { path } => commands::catalog::validate(&path, &mut out)?,
        },
        Commands::Cart { data_dir, action } => {
            let data_dir = data_dir.unwrap_or(config.data_dir);
            match action {
                CartAction::Show => commands::cart::show(&data_dir, &mut out)?,
                CartAction::Clear { yes } => commands::cart::clear(&data_dir, yes, &mut out)?,
            }
        }
    }
    Ok(())
}
