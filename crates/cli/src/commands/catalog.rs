//! Catalog inspection commands.
//!
//! # Usage
//!
//! ```bash
//! # List the embedded catalog
//! drip-cli catalog list
//!
//! # List a catalog file
//! drip-cli catalog list --path catalog.json
//!
//! # Check a catalog file before deploying it
//! drip-cli catalog validate catalog.json
//! ```

use std::io::Write;
use std::path::Path;

use drip_storefront::catalog::Catalog;

use super::CommandError;

/// Load the catalog at `path`, or the embedded one.
///
/// # Errors
///
/// Returns `CommandError::Catalog` if the catalog cannot be read or is invalid.
pub fn load(path: Option<&Path>) -> Result<Catalog, CommandError> {
    let catalog = match path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    Ok(catalog)
}

/// Print one line per product: id, name, price and variants.
///
/// # Errors
///
/// Returns `CommandError` if the catalog is invalid or output fails.
pub fn list(path: Option<&Path>, out: &mut impl Write) -> Result<(), CommandError> {
    let catalog = load(path)?;
    for product in catalog.products() {
        let variants: Vec<&str> = product.variants.iter().map(|v| v.as_str()).collect();
        writeln!(
            out,
            "{:>4}  {:<28} {:>12}  [{}]",
            product.id,
            product.name,
            product.price.display(),
            variants.join(", ")
        )?;
    }
    Ok(())
}

/// Validate a catalog file and report the product count.
///
/// # Errors
///
/// Returns `CommandError::Catalog` describing the first problem found.
pub fn validate(path: &Path, out: &mut impl Write) -> Result<(), CommandError> {
    let catalog = Catalog::load(path)?;
    tracing::info!(path = %path.display(), products = catalog.len(), "Catalog is valid");
    writeln!(out, "{}: {} products OK", path.display(), catalog.len())?;
    Ok(())
}
