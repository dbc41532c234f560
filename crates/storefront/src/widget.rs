//! The storefront widget: screen state machine and action dispatch.
//!
//! [`Storefront`] owns the catalog, the cart store and the UI state (active
//! screen, search text, variant selection, pending notice). Every user
//! interaction is an [`Action`]; [`Storefront::dispatch`] applies it to
//! completion (cart mutation, persistence, screen change) and reports any
//! outward [`Effect`] such as opening an external checkout link.
//!
//! ```text
//!              view                       toggle cart
//!   Catalog ─────────────▶ Detail ────────────────────┐
//!     ▲  ▲◀──── back ─────────┘                        ▼
//!     │  └──────── toggle cart / continue shopping ─── Cart
//!     └──────────── home (from any screen)
//! ```

use drip_core::{CartKey, ProductId, VariantLabel};

use crate::cart::{CartStorage, CartStore, QuantityChange, StorageError, quantity_or_one};
use crate::catalog::{Catalog, Product};

/// Blocking notice shown when checkout-all is attempted with several lines.
pub const MULTI_ITEM_CHECKOUT_NOTICE: &str = "Para checkout com múltiplos itens, é necessário \
     integrar com uma API de pagamento no backend. Alternativamente, finalize item por item.";

/// The three mutually exclusive screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Catalog,
    Detail(ProductId),
    Cart,
}

/// Screen-level navigation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// "Ver Detalhes" on a catalog card.
    ViewProduct(ProductId),
    /// "Voltar" on the detail screen.
    Back,
    /// The cart button in the header.
    ToggleCart,
    /// "Continuar Comprando" on the empty cart.
    ContinueShopping,
    /// The home button in the header.
    Home,
}

impl Screen {
    /// Next screen for a navigation request. Requests that make no sense on
    /// the current screen leave it unchanged.
    #[must_use]
    pub const fn transition(self, nav: Navigation) -> Self {
        match (self, nav) {
            (Self::Catalog, Navigation::ViewProduct(id)) => Self::Detail(id),
            (Self::Detail(_), Navigation::Back)
            | (Self::Cart, Navigation::ToggleCart | Navigation::ContinueShopping)
            | (_, Navigation::Home) => Self::Catalog,
            (Self::Catalog | Self::Detail(_), Navigation::ToggleCart) => Self::Cart,
            (current, _) => current,
        }
    }

    #[must_use]
    pub const fn is_cart(self) -> bool {
        matches!(self, Self::Cart)
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Transient confirmation (e.g. item added).
    Confirmation,
    /// The requested operation was refused; the shopper must acknowledge.
    Blocking,
}

/// A one-shot message for the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn confirmation(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Confirmation,
            message: message.into(),
        }
    }

    fn blocking(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Blocking,
            message: message.into(),
        }
    }
}

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(Navigation),
    /// New search text for the catalog grid.
    Search(String),
    /// Variant chosen in the detail screen's selector.
    SelectVariant(VariantLabel),
    /// Add to cart. `quantity` is the raw input (unparseable or non-positive
    /// means 1); `variant` falls back to the detail selection, then to the
    /// product's first variant.
    AddToCart {
        product_id: ProductId,
        quantity: Option<String>,
        variant: Option<VariantLabel>,
    },
    Increment(CartKey),
    Decrement(CartKey),
    /// Direct numeric edit of a line's quantity.
    SetQuantity(CartKey, String),
    Remove(CartKey),
    /// "Finalizar item": open the line's checkout link.
    CheckoutLine(CartKey),
    /// "Finalizar Compra": only supported for a single distinct line.
    CheckoutAll,
    /// First step of "Limpar Carrinho".
    RequestClear,
    ConfirmClear,
    CancelClear,
}

/// Outward consequence of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Open this external checkout link in a new browsing context. No
    /// quantity or variant is communicated.
    OpenCheckout(String),
}

/// The widget: catalog, cart and UI state, owned together.
#[derive(Debug)]
pub struct Storefront<S> {
    catalog: Catalog,
    store: CartStore<S>,
    screen: Screen,
    search: String,
    selected_variant: Option<VariantLabel>,
    notice: Option<Notice>,
    confirming_clear: bool,
}

impl<S: CartStorage> Storefront<S> {
    /// Create the widget, hydrating the cart from `storage`.
    pub fn new(catalog: Catalog, storage: S) -> Self {
        Self {
            catalog,
            store: CartStore::hydrate(storage),
            screen: Screen::default(),
            search: String::new(),
            selected_variant: None,
            notice: None,
            confirming_clear: false,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Variant currently selected in the detail screen.
    #[must_use]
    pub const fn selected_variant(&self) -> Option<&VariantLabel> {
        self.selected_variant.as_ref()
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Consume the pending notice.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Whether the clear-cart confirmation is pending.
    #[must_use]
    pub const fn confirming_clear(&self) -> bool {
        self.confirming_clear
    }

    /// Product shown on the detail screen, if that screen is active.
    #[must_use]
    pub fn detail_product(&self) -> Option<&Product> {
        match self.screen {
            Screen::Detail(id) => self.catalog.get(id),
            _ => None,
        }
    }

    /// Apply one user interaction.
    #[tracing::instrument(level = "debug", skip(self), fields(screen = ?self.screen))]
    pub fn dispatch(&mut self, action: Action) -> Effect {
        match action {
            Action::Navigate(nav) => {
                self.navigate(nav);
                Effect::None
            }
            Action::Search(text) => {
                self.search = text;
                self.navigate(Navigation::Home);
                Effect::None
            }
            Action::SelectVariant(variant) => {
                if self
                    .detail_product()
                    .is_some_and(|product| product.has_variant(&variant))
                {
                    self.selected_variant = Some(variant);
                }
                Effect::None
            }
            Action::AddToCart {
                product_id,
                quantity,
                variant,
            } => {
                self.add_to_cart(product_id, quantity.as_deref(), variant);
                Effect::None
            }
            Action::Increment(key) => {
                let result = self.store.increment(&key);
                log_mutation("increment", &key, result)
            }
            Action::Decrement(key) => {
                let result = self.store.decrement(&key);
                log_mutation("decrement", &key, result)
            }
            Action::SetQuantity(key, raw) => {
                let result = self.store.update_quantity(&key, &raw);
                log_mutation("set_quantity", &key, result)
            }
            Action::Remove(key) => {
                if let Err(e) = self.store.remove(&key) {
                    tracing::error!(error = %e, %key, "Failed to persist cart after remove");
                }
                Effect::None
            }
            Action::CheckoutLine(key) => self.store.cart().get(&key).map_or_else(
                || {
                    tracing::debug!(%key, "Checkout requested for missing line");
                    Effect::None
                },
                |line| Effect::OpenCheckout(line.checkout_url.clone()),
            ),
            Action::CheckoutAll => self.checkout_all(),
            Action::RequestClear => {
                self.confirming_clear = self.screen.is_cart() && !self.store.cart().is_empty();
                Effect::None
            }
            Action::ConfirmClear => {
                if self.confirming_clear {
                    self.confirming_clear = false;
                    match self.store.clear() {
                        Ok(()) => tracing::info!("Cart cleared"),
                        Err(e) => tracing::error!(error = %e, "Failed to persist cleared cart"),
                    }
                }
                Effect::None
            }
            Action::CancelClear => {
                self.confirming_clear = false;
                Effect::None
            }
        }
    }

    fn navigate(&mut self, nav: Navigation) {
        if let Navigation::ViewProduct(id) = nav {
            if self.catalog.get(id).is_none() {
                tracing::debug!(product_id = %id, "View requested for unknown product");
                return;
            }
        }

        let next = self.screen.transition(nav);
        if next != self.screen {
            tracing::debug!(from = ?self.screen, to = ?next, "Screen change");
            self.screen = next;
            self.selected_variant = None;
            self.confirming_clear = false;
        }
    }

    fn add_to_cart(
        &mut self,
        product_id: ProductId,
        raw_quantity: Option<&str>,
        variant: Option<VariantLabel>,
    ) {
        let Some(product) = self.catalog.get(product_id) else {
            tracing::debug!(%product_id, "Add requested for unknown product");
            return;
        };

        let variant = match variant {
            Some(variant) => variant,
            None => match (&self.screen, &self.selected_variant) {
                (Screen::Detail(id), Some(selected)) if *id == product_id => selected.clone(),
                _ => match product.default_variant() {
                    Some(first) => first.clone(),
                    None => return,
                },
            },
        };
        if !product.has_variant(&variant) {
            tracing::debug!(%product_id, %variant, "Add requested for undeclared variant");
            return;
        }

        let quantity = quantity_or_one(raw_quantity);
        let message = format!("{} ({variant}) adicionado ao carrinho.", product.name);
        if matches!(self.screen, Screen::Detail(id) if id == product_id) {
            self.selected_variant = Some(variant.clone());
        }

        match self.store.add(product, variant, quantity) {
            Ok(total) => {
                tracing::info!(%product_id, quantity = quantity.get(), line_quantity = total, "Added to cart");
            }
            Err(e) => tracing::error!(error = %e, %product_id, "Failed to persist cart after add"),
        }
        self.notice = Some(Notice::confirmation(message));
    }

    fn checkout_all(&mut self) -> Effect {
        if let Some(line) = self.store.cart().sole_line() {
            return Effect::OpenCheckout(line.checkout_url.clone());
        }
        tracing::info!(
            lines = self.store.cart().len(),
            "Checkout-all refused: only single-line checkout is supported"
        );
        self.notice = Some(Notice::blocking(MULTI_ITEM_CHECKOUT_NOTICE));
        Effect::None
    }
}

fn log_mutation(
    op: &'static str,
    key: &CartKey,
    result: Result<QuantityChange, StorageError>,
) -> Effect {
    match result {
        Ok(change) => tracing::debug!(op, %key, ?change, "Cart line changed"),
        Err(e) => tracing::error!(error = %e, op, %key, "Failed to persist cart"),
    }
    Effect::None
}
