//! Cart route handlers.
//!
//! Line routes carry the textual cart key (`{product_id}_{variant}`) as a path
//! segment. A key that does not parse is a client error; a key that parses but
//! names no line is a silent no-op.

use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use drip_core::CartKey;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::routes::effect_response;
use crate::state::AppState;
use crate::views::CartCountTemplate;
use crate::widget::{Action, Navigation};

/// Direct quantity edit form data. The value is raw user input.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    #[serde(default)]
    pub quantity: String,
}

fn dispatch(state: &AppState, action: Action) -> Result<Response> {
    let effect = state.storefront().dispatch(action);
    effect_response(effect)
}

fn parse_key(raw: &str) -> Result<CartKey> {
    raw.parse::<CartKey>().map_err(AppError::from)
}

/// Header cart button: open or close the cart.
#[instrument(skip(state))]
pub async fn toggle(State(state): State<AppState>) -> Result<Response> {
    dispatch(&state, Action::Navigate(Navigation::ToggleCart))
}

/// "Continuar Comprando" on the empty cart.
#[instrument(skip(state))]
pub async fn continue_shopping(State(state): State<AppState>) -> Result<Response> {
    dispatch(&state, Action::Navigate(Navigation::ContinueShopping))
}

#[instrument(skip(state))]
pub async fn increment(State(state): State<AppState>, Path(key): Path<String>) -> Result<Response> {
    dispatch(&state, Action::Increment(parse_key(&key)?))
}

/// Decrease by one, never below 1.
#[instrument(skip(state))]
pub async fn decrement(State(state): State<AppState>, Path(key): Path<String>) -> Result<Response> {
    dispatch(&state, Action::Decrement(parse_key(&key)?))
}

/// Direct quantity edit. Zero or unparseable input removes the line.
#[instrument(skip(state))]
pub async fn set_quantity(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Form(form): Form<QuantityForm>,
) -> Result<Response> {
    dispatch(&state, Action::SetQuantity(parse_key(&key)?, form.quantity))
}

#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Path(key): Path<String>) -> Result<Response> {
    dispatch(&state, Action::Remove(parse_key(&key)?))
}

/// "Finalizar item": redirect to the line's external checkout link.
#[instrument(skip(state))]
pub async fn checkout_line(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    dispatch(&state, Action::CheckoutLine(parse_key(&key)?))
}

/// "Finalizar Compra": only a single distinct line can be checked out; more
/// lines produce a blocking notice on the next render.
#[instrument(skip(state))]
pub async fn checkout_all(State(state): State<AppState>) -> Result<Response> {
    dispatch(&state, Action::CheckoutAll)
}

/// "Limpar Carrinho": ask for confirmation first.
#[instrument(skip(state))]
pub async fn request_clear(State(state): State<AppState>) -> Result<Response> {
    dispatch(&state, Action::RequestClear)
}

#[instrument(skip(state))]
pub async fn confirm_clear(State(state): State<AppState>) -> Result<Response> {
    dispatch(&state, Action::ConfirmClear)
}

#[instrument(skip(state))]
pub async fn cancel_clear(State(state): State<AppState>) -> Result<Response> {
    dispatch(&state, Action::CancelClear)
}

/// Cart count badge fragment.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> CartCountTemplate {
    let count = state.storefront().store().cart().aggregate_quantity();
    CartCountTemplate { count }
}
