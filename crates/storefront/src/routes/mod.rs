//! HTTP route handlers for the storefront.
//!
//! The widget is one page. Every interaction is a form post that dispatches an
//! [`Action`](crate::widget::Action) and answers `303 See Other`, back to `/`
//! or out to an external checkout link.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Current screen (?cart=1 opens the cart, ?q= searches)
//! GET  /health                        - Health check
//! POST /home                          - Back to the catalog
//! POST /search                        - Filter the catalog
//!
//! # Products
//! POST /products/{id}/view            - Open the detail screen
//! POST /products/{id}/add             - Add to cart
//! POST /detail/back                   - Detail back to catalog
//! POST /detail/variant                - Record the selected variant (204)
//!
//! # Cart
//! POST /cart/toggle                   - Open or close the cart
//! POST /cart/continue                 - Continue shopping
//! POST /cart/lines/{key}/increment
//! POST /cart/lines/{key}/decrement
//! POST /cart/lines/{key}/quantity     - Direct quantity edit
//! POST /cart/lines/{key}/remove
//! POST /cart/lines/{key}/checkout     - Redirect to the line's checkout link
//! POST /cart/checkout                 - Checkout all
//! POST /cart/clear                    - Ask for confirmation
//! POST /cart/clear/confirm
//! POST /cart/clear/cancel
//! GET  /cart/count                    - Cart count badge (fragment)
//! ```

pub mod cart;
pub mod catalog;

use std::path::Path;

use axum::{
    Router,
    http::{HeaderValue, StatusCode, Uri, header::LOCATION},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::{AppError, Result};
use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;
use crate::widget::Effect;

/// Create the product and detail routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/view", post(catalog::view))
        .route("/{id}/add", post(catalog::add))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(cart::toggle))
        .route("/continue", post(cart::continue_shopping))
        .route("/lines/{key}/increment", post(cart::increment))
        .route("/lines/{key}/decrement", post(cart::decrement))
        .route("/lines/{key}/quantity", post(cart::set_quantity))
        .route("/lines/{key}/remove", post(cart::remove))
        .route("/lines/{key}/checkout", post(cart::checkout_line))
        .route("/checkout", post(cart::checkout_all))
        .route("/clear", post(cart::request_clear))
        .route("/clear/confirm", post(cart::confirm_clear))
        .route("/clear/cancel", post(cart::cancel_clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/home", post(catalog::home))
        .route("/search", post(catalog::search))
        .route("/detail/back", post(catalog::back))
        .route("/detail/variant", post(catalog::select_variant))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
}

/// Build the complete application: routes, static files and middleware.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            },
        ))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Turn a dispatch outcome into the post/redirect/get response.
pub(crate) fn effect_response(effect: Effect) -> Result<Response> {
    match effect {
        Effect::None => Ok(Redirect::to("/").into_response()),
        Effect::OpenCheckout(url) => {
            let location = HeaderValue::from_str(&url)
                .map_err(|e| AppError::Internal(format!("unusable checkout link {url:?}: {e}")))?;
            tracing::info!(checkout_url = %url, "Redirecting to external checkout");
            Ok((StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_none_redirects_home() {
        let response = effect_response(Effect::None).unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
    }

    #[test]
    fn test_checkout_effect_redirects_out() {
        let url = "https://dripsupply-co.pay.yampi.com.br/r/A772UWY2AJ";
        let response = effect_response(Effect::OpenCheckout(url.to_string())).unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), url);
    }

    #[test]
    fn test_unusable_checkout_link_is_internal_error() {
        let err = effect_response(Effect::OpenCheckout("https://x\n".to_string())).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
