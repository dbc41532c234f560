//! View models and templates for the three screens.
//!
//! Rendering is a projection of [`Storefront`] state: nothing here mutates the
//! cart. The only state consumed by a render is the pending notice, which is
//! shown exactly once.

use askama::Template;
use askama_web::WebTemplate;

use crate::cart::{Cart, CartLine, CartStorage};
use crate::catalog::Product;
use crate::filters;
use crate::widget::{NoticeKind, Screen, Storefront};

/// Catalog grid card.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub image: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            price: product.price.display(),
            image: product.image.clone(),
        }
    }
}

/// One entry of the variant selector.
#[derive(Debug, Clone)]
pub struct VariantOptionView {
    pub label: String,
    pub selected: bool,
}

/// Product detail screen.
#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub variants: Vec<VariantOptionView>,
}

impl ProductDetailView {
    fn new(product: &Product, selected: Option<&str>) -> Self {
        let selected = selected.or_else(|| product.default_variant().map(|v| v.as_str()));
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            image: product.image.clone(),
            variants: product
                .variants
                .iter()
                .map(|v| VariantOptionView {
                    label: v.to_string(),
                    selected: Some(v.as_str()) == selected,
                })
                .collect(),
        }
    }
}

/// Cart line display data.
#[derive(Debug, Clone)]
pub struct CartLineView {
    /// Textual cart key (`1_42`).
    pub key: String,
    /// Cart key encoded for use as a URL path segment.
    pub key_path: String,
    pub name: String,
    pub variant: String,
    pub image: String,
    pub unit_price: String,
    pub line_total: String,
    pub quantity: u32,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let key = line.key().to_string();
        Self {
            key_path: urlencoding::encode(&key).into_owned(),
            key,
            name: line.name.clone(),
            variant: line.variant.to_string(),
            image: line.image.clone(),
            unit_price: line.price.display(),
            line_total: line.total().display(),
            quantity: line.quantity,
        }
    }
}

/// Cart screen display data.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u32,
    /// Exactly one distinct line: "Finalizar Compra" leaves for the external
    /// checkout in a new tab. Otherwise it posts in place to show the notice.
    pub single_line: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().map(CartLineView::from).collect(),
            subtotal: cart.subtotal().display(),
            item_count: cart.aggregate_quantity(),
            single_line: cart.sole_line().is_some(),
        }
    }
}

/// Notice banner or dialog.
#[derive(Debug, Clone)]
pub struct NoticeView {
    pub message: String,
    pub blocking: bool,
}

/// The whole widget page.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct PageTemplate {
    pub show_catalog: bool,
    pub show_detail: bool,
    pub show_cart: bool,
    pub search: String,
    pub cart_count: u32,
    pub products: Vec<ProductCardView>,
    pub detail: Option<ProductDetailView>,
    pub cart: CartView,
    pub notice: Option<NoticeView>,
    pub confirming_clear: bool,
}

impl PageTemplate {
    /// Project the widget into a page, consuming its pending notice.
    pub fn render_state<S: CartStorage>(widget: &mut Storefront<S>) -> Self {
        let notice = widget.take_notice().map(|n| NoticeView {
            blocking: n.kind == NoticeKind::Blocking,
            message: n.message,
        });

        let screen = widget.screen();
        let cart = widget.store().cart();
        let products = if screen == Screen::Catalog {
            widget
                .catalog()
                .search(widget.search())
                .map(ProductCardView::from)
                .collect()
        } else {
            Vec::new()
        };
        let detail = widget.detail_product().map(|product| {
            ProductDetailView::new(product, widget.selected_variant().map(|v| v.as_str()))
        });

        Self {
            show_catalog: screen == Screen::Catalog,
            show_detail: detail.is_some(),
            show_cart: screen == Screen::Cart,
            search: widget.search().to_owned(),
            cart_count: cart.aggregate_quantity(),
            products,
            detail,
            cart: CartView::from(cart),
            notice,
            confirming_clear: widget.confirming_clear(),
        }
    }
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}
