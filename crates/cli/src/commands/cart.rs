//! Cart maintenance commands.
//!
//! These operate on the same storage slot the storefront uses, so they should
//! be run while the server is stopped.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! drip-cli cart show --data-dir ./data
//!
//! # Empty it
//! drip-cli cart clear --data-dir ./data --yes
//! ```

use std::io::Write;
use std::path::Path;

use drip_storefront::cart::{CartStore, FileStorage};

use super::CommandError;

/// Print every line with its total, then the aggregate quantity and subtotal.
///
/// # Errors
///
/// Returns `CommandError::Output` if writing fails. Unreadable cart data is
/// reported as an empty cart, the same way the storefront treats it.
pub fn show(data_dir: &Path, out: &mut impl Write) -> Result<(), CommandError> {
    let store = CartStore::hydrate(FileStorage::new(data_dir));
    let cart = store.cart();

    if cart.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    for line in cart.lines() {
        writeln!(
            out,
            "{:<10} {:<28} {:>3} x {:>12} = {:>12}",
            line.key().to_string(),
            line.name,
            line.quantity,
            line.price.display(),
            line.total().display()
        )?;
    }
    writeln!(
        out,
        "{} items, subtotal {}",
        cart.aggregate_quantity(),
        cart.subtotal().display()
    )?;
    Ok(())
}

/// Remove every line and persist the empty cart.
///
/// # Errors
///
/// Returns `CommandError::NotConfirmed` unless `confirmed`, or
/// `CommandError::Storage` if the empty cart cannot be written.
pub fn clear(data_dir: &Path, confirmed: bool, out: &mut impl Write) -> Result<(), CommandError> {
    if !confirmed {
        return Err(CommandError::NotConfirmed("clear the cart"));
    }
    let mut store = CartStore::hydrate(FileStorage::new(data_dir));
    let removed = store.cart().len();
    store.clear()?;
    tracing::info!(data_dir = %data_dir.display(), removed, "Cart cleared");
    writeln!(out, "Removed {removed} lines")?;
    Ok(())
}
