//! Application state shared across handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cart::CartStorage;
use crate::catalog::Catalog;
use crate::widget::Storefront;

/// The widget as held by the server: storage is chosen at startup.
pub type SharedStorefront = Storefront<Box<dyn CartStorage>>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The host serves a single
/// shopper, so there is exactly one widget per process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    storefront: Mutex<SharedStorefront>,
}

impl AppState {
    /// Create a new application state, hydrating the cart from `storage`.
    #[must_use]
    pub fn new(catalog: Catalog, storage: Box<dyn CartStorage>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                storefront: Mutex::new(Storefront::new(catalog, storage)),
            }),
        }
    }

    /// Lock the widget. A poisoned lock is recovered.
    pub fn storefront(&self) -> MutexGuard<'_, SharedStorefront> {
        self.inner
            .storefront
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
