//! Subcommand implementations.
//!
//! Commands write their report to the supplied writer so they can be tested
//! without capturing stdout.

pub mod cart;
pub mod catalog;

use thiserror::Error;

use drip_storefront::cart::StorageError;
use drip_storefront::catalog::CatalogError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Destructive command run without confirmation.
    #[error("Refusing to {0} without --yes")]
    NotConfirmed(&'static str),
}
