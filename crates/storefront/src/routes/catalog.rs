//! Page, catalog and product detail handlers.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use drip_core::{ProductId, VariantLabel};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::routes::effect_response;
use crate::state::AppState;
use crate::views::PageTemplate;
use crate::widget::{Action, Effect, Navigation};

/// Query parameters accepted by the page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// `?cart=1` opens the cart screen.
    pub cart: Option<String>,
    /// `?q=` sets the search text.
    pub q: Option<String>,
}

/// Search form data.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub q: String,
}

/// Add to cart form data. Both fields are raw user input.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartForm {
    pub quantity: Option<String>,
    pub variant: Option<String>,
}

/// Variant selector form data.
#[derive(Debug, Deserialize)]
pub struct SelectVariantForm {
    pub variant: String,
}

/// Render the current screen.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, Query(query): Query<PageQuery>) -> PageTemplate {
    let mut widget = state.storefront();

    if let Some(q) = query.q {
        widget.dispatch(Action::Search(q));
    }
    if query.cart.as_deref() == Some("1") && !widget.screen().is_cart() {
        widget.dispatch(Action::Navigate(Navigation::ToggleCart));
    }

    PageTemplate::render_state(&mut *widget)
}

/// Home button: back to the catalog from any screen.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Response> {
    let effect = state
        .storefront()
        .dispatch(Action::Navigate(Navigation::Home));
    effect_response(effect)
}

/// Update the search text. Always lands on the catalog.
#[instrument(skip(state))]
pub async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Result<Response> {
    let effect = state.storefront().dispatch(Action::Search(form.q));
    effect_response(effect)
}

/// "Ver Detalhes": open a product's detail screen.
#[instrument(skip(state))]
pub async fn view(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Response> {
    let effect = state
        .storefront()
        .dispatch(Action::Navigate(Navigation::ViewProduct(id)));
    effect_response(effect)
}

/// "Voltar" on the detail screen.
#[instrument(skip(state))]
pub async fn back(State(state): State<AppState>) -> Result<Response> {
    let effect = state
        .storefront()
        .dispatch(Action::Navigate(Navigation::Back));
    effect_response(effect)
}

/// Record the detail screen's selector value.
///
/// Posted in the background by the page script; answers `204 No Content`.
#[instrument(skip(state))]
pub async fn select_variant(
    State(state): State<AppState>,
    Form(form): Form<SelectVariantForm>,
) -> StatusCode {
    match VariantLabel::parse(&form.variant) {
        Ok(variant) => {
            state.storefront().dispatch(Action::SelectVariant(variant));
        }
        Err(e) => tracing::debug!(error = %e, "Ignoring unusable variant selection"),
    }
    StatusCode::NO_CONTENT
}

/// Add a product to the cart, from a catalog card or the detail screen.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let variant = match form.variant.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match VariantLabel::parse(raw) {
            Ok(variant) => Some(variant),
            Err(e) => {
                // Cannot match any declared variant, so nothing is added.
                tracing::debug!(error = %e, %product_id, "Ignoring add with unusable variant");
                return effect_response(Effect::None);
            }
        },
    };

    let effect = state.storefront().dispatch(Action::AddToCart {
        product_id,
        quantity: form.quantity,
        variant,
    });
    effect_response(effect)
}
