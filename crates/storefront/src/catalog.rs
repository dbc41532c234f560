//! Immutable product catalog.
//!
//! The catalog is fixed for the lifetime of the process. By default it is the
//! JSON document embedded at build time (`catalog/default.json`); a different
//! document can be supplied at startup via `STOREFRONT_CATALOG_PATH`.
//!
//! Field names from the legacy storefront script (`img`, `desc`, `checkout`,
//! `sizes`) are accepted as aliases so existing product sheets load as-is.

use std::collections::HashSet;
use std::path::Path;

use drip_core::{Price, PriceError, ProductId, VariantLabel};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const BUILTIN_CATALOG: &str = include_str!("../catalog/default.json");

/// Errors that can occur while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog has no products")]
    Empty,
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),
    #[error("product {0} declares no variants")]
    NoVariants(ProductId),
    #[error("product {0}: {1}")]
    NegativePrice(ProductId, #[source] PriceError),
    #[error("product {id} has an invalid checkout link {url:?}: {reason}")]
    InvalidCheckoutUrl {
        id: ProductId,
        url: String,
        reason: String,
    },
}

/// A product record, defined at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(alias = "img")]
    pub image: String,
    #[serde(alias = "desc", default)]
    pub description: String,
    /// External payment page for this product. Receives no quantity or
    /// variant parameters.
    #[serde(alias = "checkout")]
    pub checkout_url: String,
    #[serde(alias = "sizes")]
    pub variants: Vec<VariantLabel>,
}

impl Product {
    /// The first declared variant, used when none is chosen explicitly.
    #[must_use]
    pub fn default_variant(&self) -> Option<&VariantLabel> {
        self.variants.first()
    }

    /// Whether `variant` is one of this product's declared variants.
    #[must_use]
    pub fn has_variant(&self, variant: &VariantLabel) -> bool {
        self.variants.contains(variant)
    }

    /// Case-insensitive substring match on the product name.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        query.is_empty() || self.name.to_lowercase().contains(&query.to_lowercase())
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.variants.is_empty() {
            return Err(CatalogError::NoVariants(self.id));
        }
        Price::try_brl(self.price.amount).map_err(|e| CatalogError::NegativePrice(self.id, e))?;
        let invalid = |reason: String| CatalogError::InvalidCheckoutUrl {
            id: self.id,
            url: self.checkout_url.clone(),
            reason,
        };
        let url = Url::parse(&self.checkout_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        Ok(())
    }
}

/// The read-only list of products offered by the store.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from product records, validating them.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the list is empty, ids repeat, or a product
    /// has no variants, a negative price, or a non-http(s) checkout link.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        if products.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
            product.validate()?;
        }
        Ok(Self { products })
    }

    /// The catalog embedded at build time.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded document is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// All products, in declaration order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products whose name contains `query`, ignoring case.
    ///
    /// An empty query returns every product.
    pub fn search<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Product> + 'a {
        self.products.iter().filter(move |p| p.matches(query))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
