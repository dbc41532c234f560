//! Shopping cart: lines keyed by product and variant, persisted as one slot.
//!
//! [`Cart`] holds the pure state and its transitions. [`CartStore`] owns a
//! `Cart` together with a [`CartStorage`] backend and writes the whole cart
//! back after every mutation.
//!
//! # Persisted format
//!
//! ```json
//! {
//!   "1_42": { "id": 1, "name": "Nike Air Max Plus TN", "price": "150.00",
//!             "img": "/static/img/airmaxplus.jpg", "size": "42", "qty": 3,
//!             "checkout": "https://..." }
//! }
//! ```
//!
//! Older data with numeric `price`/`size` still loads. Lines with a missing or
//! non-positive `qty` are dropped on load.

pub mod storage;

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use drip_core::{CartKey, Price, ProductId, VariantLabel};
use serde::{Deserialize, Deserializer, Serialize};

pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

use crate::catalog::Product;

/// Namespace key of the storage slot holding the cart.
pub const CART_STORAGE_KEY: &str = "drip_cart_v1";

/// One product variant in the cart, with the product data cached at the time
/// it was first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(rename = "img")]
    pub image: String,
    #[serde(rename = "size")]
    pub variant: VariantLabel,
    /// Always >= 1 while the line is in a [`Cart`].
    #[serde(rename = "qty", default, deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    #[serde(rename = "checkout")]
    pub checkout_url: String,
}

impl CartLine {
    fn from_product(product: &Product, variant: VariantLabel, quantity: NonZeroU32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            variant,
            quantity: quantity.get(),
            checkout_url: product.checkout_url.clone(),
        }
    }

    #[must_use]
    pub fn key(&self) -> CartKey {
        CartKey::new(self.product_id, self.variant.clone())
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Negative quantities in stored data become 0 so the line can be dropped
/// instead of failing the whole cart.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(u32::try_from(raw.max(0)).unwrap_or(u32::MAX))
}

/// Parse a quantity typed by the shopper.
///
/// Reads an optional sign followed by the leading digits, ignoring leading
/// whitespace and anything after the digits (`"3"`, `" 3 "`, `"3un"` → 3).
/// Returns `None` when no digits lead the input.
#[must_use]
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, s.get(1..)?),
        Some(b'+') => (false, s.get(1..)?),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = digits.get(..end)?;
    if digits.is_empty() {
        return None;
    }
    // Overlong input saturates instead of failing.
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Quantity for an add: unparseable or non-positive input means 1.
#[must_use]
pub fn quantity_or_one(raw: Option<&str>) -> NonZeroU32 {
    raw.and_then(parse_quantity)
        .and_then(|q| u32::try_from(q).ok())
        .and_then(NonZeroU32::new)
        .unwrap_or(NonZeroU32::MIN)
}

/// What a quantity change did to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has this quantity.
    Updated(u32),
    /// The line was deleted.
    Removed,
    /// No line exists for the key.
    Missing,
}

/// Pure cart state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<CartKey, CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in key order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    #[must_use]
    pub fn get(&self, key: &CartKey) -> Option<&CartLine> {
        self.lines.get(key)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The only line, if the cart has exactly one.
    #[must_use]
    pub fn sole_line(&self) -> Option<&CartLine> {
        let mut lines = self.lines.values();
        match (lines.next(), lines.next()) {
            (Some(line), None) => Some(line),
            _ => None,
        }
    }

    /// Add `quantity` units of `product` in `variant`.
    ///
    /// Merges into the existing line for the same key. Returns the line's
    /// resulting quantity.
    pub fn add(&mut self, product: &Product, variant: VariantLabel, quantity: NonZeroU32) -> u32 {
        let key = CartKey::new(product.id, variant.clone());
        let line = self
            .lines
            .entry(key)
            .and_modify(|line| line.quantity = line.quantity.saturating_add(quantity.get()))
            .or_insert_with(|| CartLine::from_product(product, variant, quantity));
        line.quantity
    }

    /// Replace a line's quantity; zero deletes the line.
    pub fn set_quantity(&mut self, key: &CartKey, quantity: u32) -> QuantityChange {
        if !self.lines.contains_key(key) {
            return QuantityChange::Missing;
        }
        if quantity == 0 {
            self.lines.remove(key);
            return QuantityChange::Removed;
        }
        if let Some(line) = self.lines.get_mut(key) {
            line.quantity = quantity;
        }
        QuantityChange::Updated(quantity)
    }

    /// Apply a quantity typed by the shopper. Non-positive or unparseable
    /// input deletes the line.
    pub fn update_quantity(&mut self, key: &CartKey, raw: &str) -> QuantityChange {
        let quantity = parse_quantity(raw)
            .map_or(0, |q| u32::try_from(q.max(0)).unwrap_or(u32::MAX));
        self.set_quantity(key, quantity)
    }

    /// One more unit.
    pub fn increment(&mut self, key: &CartKey) -> QuantityChange {
        match self.lines.get(key) {
            Some(line) => self.set_quantity(key, line.quantity.saturating_add(1)),
            None => QuantityChange::Missing,
        }
    }

    /// One fewer unit, never below 1.
    pub fn decrement(&mut self, key: &CartKey) -> QuantityChange {
        match self.lines.get(key) {
            Some(line) => self.set_quantity(key, line.quantity.saturating_sub(1).max(1)),
            None => QuantityChange::Missing,
        }
    }

    /// Delete a line. Removing a missing key is a no-op.
    pub fn remove(&mut self, key: &CartKey) -> Option<CartLine> {
        self.lines.remove(key)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total units across all lines (the badge count).
    #[must_use]
    pub fn aggregate_quantity(&self) -> u32 {
        self.lines
            .values()
            .fold(0_u32, |sum, line| sum.saturating_add(line.quantity))
    }

    /// Sum of unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.values().map(CartLine::total).sum()
    }

    /// Serialize the whole cart.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    /// Deserialize a cart.
    ///
    /// Map keys are rebuilt from each line's own product id and variant, lines
    /// with a zero quantity are dropped, and lines that collapse onto the same
    /// key are merged.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if `raw` is not a valid cart document.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let stored: BTreeMap<String, CartLine> = serde_json::from_str(raw)?;
        let mut lines: BTreeMap<CartKey, CartLine> = BTreeMap::new();
        for line in stored.into_values().filter(|line| line.quantity > 0) {
            lines
                .entry(line.key())
                .and_modify(|existing| {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                })
                .or_insert(line);
        }
        Ok(Self { lines })
    }
}

/// A [`Cart`] bound to the storage slot it is persisted in.
#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Load the cart from `storage`.
    ///
    /// Missing, unreadable, or malformed data yields an empty cart.
    pub fn hydrate(storage: S) -> Self {
        let cart = match storage.load(CART_STORAGE_KEY) {
            Ok(Some(raw)) => Cart::from_json(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding malformed saved cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved cart, starting empty");
                Cart::new()
            }
        };
        tracing::debug!(lines = cart.len(), "Cart hydrated");
        Self { cart, storage }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Add units and persist. Returns the line's resulting quantity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be written; the in-memory
    /// cart keeps the change.
    pub fn add(
        &mut self,
        product: &Product,
        variant: VariantLabel,
        quantity: NonZeroU32,
    ) -> Result<u32, StorageError> {
        let total = self.cart.add(product, variant, quantity);
        self.persist()?;
        Ok(total)
    }

    /// Apply a typed quantity and persist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be written.
    pub fn update_quantity(
        &mut self,
        key: &CartKey,
        raw: &str,
    ) -> Result<QuantityChange, StorageError> {
        let change = self.cart.update_quantity(key, raw);
        self.persist()?;
        Ok(change)
    }

    /// Increment and persist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be written.
    pub fn increment(&mut self, key: &CartKey) -> Result<QuantityChange, StorageError> {
        let change = self.cart.increment(key);
        self.persist()?;
        Ok(change)
    }

    /// Decrement (floor 1) and persist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be written.
    pub fn decrement(&mut self, key: &CartKey) -> Result<QuantityChange, StorageError> {
        let change = self.cart.decrement(key);
        self.persist()?;
        Ok(change)
    }

    /// Remove a line (idempotent) and persist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be written.
    pub fn remove(&mut self, key: &CartKey) -> Result<Option<CartLine>, StorageError> {
        let removed = self.cart.remove(key);
        self.persist()?;
        Ok(removed)
    }

    /// Empty the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be written.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.persist()
    }

    /// Write the whole cart to its slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub fn persist(&mut self) -> Result<(), StorageError> {
        let json = self.cart.to_json()?;
        self.storage.save(CART_STORAGE_KEY, &json)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    fn label(s: &str) -> VariantLabel {
        VariantLabel::parse(s).unwrap()
    }

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn key(id: i32, variant: &str) -> CartKey {
        CartKey::new(ProductId::new(id), label(variant))
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3"), Some(3));
        assert_eq!(parse_quantity("  12 "), Some(12));
        assert_eq!(parse_quantity("4un"), Some(4));
        assert_eq!(parse_quantity("2.9"), Some(2));
        assert_eq!(parse_quantity("-2"), Some(-2));
        assert_eq!(parse_quantity("+5"), Some(5));
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity("-"), None);
    }

    #[test]
    fn test_quantity_or_one() {
        assert_eq!(quantity_or_one(Some("3")).get(), 3);
        assert_eq!(quantity_or_one(Some("")).get(), 1);
        assert_eq!(quantity_or_one(Some("0")).get(), 1);
        assert_eq!(quantity_or_one(Some("-4")).get(), 1);
        assert_eq!(quantity_or_one(None).get(), 1);
    }

    #[test]
    fn test_repeated_adds_merge() {
        let catalog = catalog();
        let product = catalog.get(ProductId::new(1)).unwrap();
        let mut cart = Cart::new();

        assert_eq!(cart.add(product, label("42"), qty(1)), 1);
        assert_eq!(cart.add(product, label("42"), qty(2)), 3);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.aggregate_quantity(), 3);
        assert_eq!(cart.subtotal(), Price::from_cents(45_000));
    }

    #[test]
    fn test_totals_saturate_for_huge_prices() {
        let catalog = Catalog::from_json(
            r#"[{"id":9,"name":"Raro","price":"79228162514264337593543950335","image":"r.jpg","checkout_url":"https://pay.example/r/R","variants":["U"]}]"#,
        )
        .unwrap();
        let product = catalog.get(ProductId::new(9)).unwrap();
        let mut cart = Cart::new();
        cart.add(product, label("U"), qty(1));
        cart.set_quantity(&key(9, "U"), u32::MAX);

        let line = cart.get(&key(9, "U")).unwrap();
        assert_eq!(line.total(), cart.subtotal());
        assert!(!cart.subtotal().display().is_empty());
    }

    #[test]
    fn test_variants_are_separate_lines() {
        let catalog = catalog();
        let product = catalog.get(ProductId::new(1)).unwrap();
        let mut cart = Cart::new();
        cart.add(product, label("42"), qty(1));
        cart.add(product, label("43"), qty(2));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.aggregate_quantity(), 3);
        assert!(cart.sole_line().is_none());
    }

    #[test]
    fn test_line_caches_product_data() {
        let catalog = catalog();
        let product = catalog.get(ProductId::new(3)).unwrap();
        let mut cart = Cart::new();
        cart.add(product, label("M"), qty(1));
        let line = cart.get(&key(3, "M")).unwrap();
        assert_eq!(line.name, "Conjunto Tech Fleece");
        assert_eq!(line.checkout_url, product.checkout_url);
        assert_eq!(line.image, product.image);
        assert_eq!(cart.sole_line(), Some(line));
    }

    #[test]
    fn test_update_quantity_non_positive_removes() {
        let catalog = catalog();
        let product = catalog.get(ProductId::new(1)).unwrap();
        for raw in ["0", "-3", "abc", ""] {
            let mut cart = Cart::new();
            cart.add(product, label("42"), qty(2));
            assert_eq!(cart.update_quantity(&key(1, "42"), raw), QuantityChange::Removed);
            assert!(cart.get(&key(1, "42")).is_none());
            assert_eq!(cart.aggregate_quantity(), 0);
        }
    }

    #[test]
    fn test_update_quantity_replaces() {
        let catalog = catalog();
        let product = catalog.get(ProductId::new(1)).unwrap();
        let mut cart = Cart::new();
        cart.add(product, label("42"), qty(2));
        assert_eq!(
            cart.update_quantity(&key(1, "42"), "7"),
            QuantityChange::Updated(7)
        );
        assert_eq!(cart.aggregate_quantity(), 7);
        assert_eq!(
            cart.update_quantity(&key(1, "40"), "7"),
            QuantityChange::Missing
        );
    }

    #[test]
    fn test_increment_and_decrement_floor() {
        let catalog = catalog();
        let product = catalog.get(ProductId::new(2)).unwrap();
        let mut cart = Cart::new();
        cart.add(product, label("40"), qty(1));
        let k = key(2, "40");
        assert_eq!(cart.increment(&k), QuantityChange::Updated(2));
        assert_eq!(cart.decrement(&k), QuantityChange::Updated(1));
        assert_eq!(cart.decrement(&k), QuantityChange::Updated(1));
        assert_eq!(cart.increment(&key(2, "41")), QuantityChange::Missing);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let catalog = catalog();
        let product = catalog.get(ProductId::new(1)).unwrap();
        let mut cart = Cart::new();
        cart.add(product, label("42"), qty(1));
        let before = cart.clone();
        assert!(cart.remove(&key(9, "42")).is_none());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_aggregate_tracks_every_operation() {
        let catalog = catalog();
        let mut cart = Cart::new();
        let p1 = catalog.get(ProductId::new(1)).unwrap();
        let p4 = catalog.get(ProductId::new(4)).unwrap();
        let check = |cart: &Cart| {
            assert_eq!(
                cart.aggregate_quantity(),
                cart.lines().map(|l| l.quantity).sum::<u32>()
            );
        };
        cart.add(p1, label("42"), qty(2));
        check(&cart);
        cart.add(p4, label("S"), qty(5));
        check(&cart);
        cart.update_quantity(&key(4, "S"), "3");
        check(&cart);
        cart.increment(&key(1, "42"));
        check(&cart);
        cart.remove(&key(1, "42"));
        check(&cart);
        cart.clear();
        check(&cart);
        assert_eq!(cart.aggregate_quantity(), 0);
        assert_eq!(cart.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_json_roundtrip() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(catalog.get(ProductId::new(1)).unwrap(), label("42"), qty(3));
        cart.add(catalog.get(ProductId::new(3)).unwrap(), label("2XL"), qty(1));
        let json = cart.to_json().unwrap();
        assert!(json.contains("\"1_42\""));
        assert_eq!(Cart::from_json(&json).unwrap(), cart);
    }

    #[test]
    fn test_from_json_reads_legacy_data() {
        let raw = r#"{
            "1_42": {"id":1,"name":"Nike Air Max Plus TN","price":150,"img":"Img/airmaxplus.jpg","size":42,"qty":2,"checkout":"https://pay.example/r/A"},
            "3_M": {"id":3,"name":"Conjunto Tech Fleece","price":250,"img":"Img/Tech.jpg","size":"M","qty":0,"checkout":"https://pay.example/r/B"},
            "4_S": {"id":4,"name":"Conjunto Denim Tears","price":250,"img":"Img/denim.png","size":"S","qty":-1,"checkout":"https://pay.example/r/C"}
        }"#;
        let cart = Cart::from_json(raw).unwrap();
        assert_eq!(cart.len(), 1);
        let line = cart.get(&key(1, "42")).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(cart.subtotal(), Price::from_cents(30_000));
    }

    #[test]
    fn test_from_json_rebuilds_keys() {
        let raw = r#"{
            "stale": {"id":1,"name":"A","price":"10","img":"a","size":"42","qty":1,"checkout":"https://x"},
            "1_42": {"id":1,"name":"A","price":"10","img":"a","size":42,"qty":2,"checkout":"https://x"}
        }"#;
        let cart = Cart::from_json(raw).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&key(1, "42")).unwrap().quantity, 3);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Cart::from_json("not json").is_err());
        assert!(Cart::from_json("[1,2,3]").is_err());
    }

    #[test]
    fn test_store_hydrates_empty_on_corrupt_data() {
        let store = CartStore::hydrate(MemoryStorage::with_slot(CART_STORAGE_KEY, "{oops"));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_store_persists_every_mutation() {
        let catalog = catalog();
        let product = catalog.get(ProductId::new(1)).unwrap();
        let mut store = CartStore::hydrate(MemoryStorage::new());

        store.add(product, label("42"), qty(1)).unwrap();
        let saved = store.storage().get(CART_STORAGE_KEY).unwrap().to_owned();
        assert_eq!(Cart::from_json(&saved).unwrap(), *store.cart());

        store.update_quantity(&key(1, "42"), "0").unwrap();
        assert_eq!(store.storage().get(CART_STORAGE_KEY), Some("{}"));
    }

    #[test]
    fn test_store_reload_yields_equal_cart() {
        let catalog = catalog();
        let mut store = CartStore::hydrate(MemoryStorage::new());
        store
            .add(catalog.get(ProductId::new(2)).unwrap(), label("44"), qty(2))
            .unwrap();
        store
            .add(catalog.get(ProductId::new(4)).unwrap(), label("XL"), qty(1))
            .unwrap();

        let reloaded = CartStore::hydrate(store.storage().clone());
        assert_eq!(reloaded.cart(), store.cart());
    }
}
