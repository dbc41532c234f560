//! End-to-end shopping flows through the HTTP surface.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use drip_core::{CartKey, ProductId, VariantLabel};
use drip_storefront::widget::MULTI_ITEM_CHECKOUT_NOTICE;
use integration_tests::TestContext;

fn key(id: i32, variant: &str) -> CartKey {
    CartKey::new(ProductId::new(id), VariantLabel::parse(variant).unwrap())
}

fn checkout_url(ctx: &TestContext, id: i32) -> String {
    ctx.state
        .storefront()
        .catalog()
        .get(ProductId::new(id))
        .unwrap()
        .checkout_url
        .clone()
}

fn line_quantity(ctx: &TestContext, key: &CartKey) -> Option<u32> {
    ctx.state
        .storefront()
        .store()
        .cart()
        .get(key)
        .map(|line| line.quantity)
}

// =============================================================================
// Page and Infrastructure
// =============================================================================

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();
    let response = ctx.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_page_renders_catalog_with_headers() {
    let ctx = TestContext::new();
    let response = ctx.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.contains_key("x-request-id"));
    assert!(response.headers.contains_key("content-security-policy"));
    assert!(response.body.contains(r#"id="productSection" aria-hidden="false""#));
    for name in [
        "Nike Air Max Plus TN",
        "Nike Air Force 1 TN",
        "Conjunto Denim Tears",
        "Conjunto Tech Fleece",
    ] {
        assert!(response.body.contains(name), "missing {name}");
    }
}

#[tokio::test]
async fn test_cart_query_opens_cart_screen() {
    let ctx = TestContext::new();
    let response = ctx.get("/?cart=1").await;
    assert!(response.body.contains(r#"id="cartSection" aria-hidden="false""#));
    assert!(response.body.contains("Seu carrinho está vazio."));

    // Reloading with the same query keeps the cart open.
    let response = ctx.get("/?cart=1").await;
    assert!(response.body.contains(r#"id="cartSection" aria-hidden="false""#));
}

#[tokio::test]
async fn test_search_filters_catalog() {
    let ctx = TestContext::new();
    let response = ctx.post("/search", "q=CONJUNTO").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));

    let page = ctx.get("/").await.body;
    assert!(page.contains("Conjunto Tech Fleece"));
    assert!(!page.contains("Nike Air Force 1 TN"));

    ctx.post("/search", "q=").await;
    assert!(ctx.get("/").await.body.contains("Nike Air Force 1 TN"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::new();
    assert_eq!(ctx.get("/nope").await.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Adding Items
// =============================================================================

#[tokio::test]
async fn test_quick_add_uses_first_variant() {
    let ctx = TestContext::new();
    let response = ctx.post("/products/1/add", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));

    assert_eq!(ctx.cart_count().await, 1);
    assert_eq!(line_quantity(&ctx, &key(1, "38")), Some(1));

    let page = ctx.get("/").await.body;
    assert!(page.contains("Nike Air Max Plus TN (38) adicionado ao carrinho."));
    // The confirmation is shown once.
    assert!(!ctx.get("/").await.body.contains("adicionado ao carrinho."));
}

#[tokio::test]
async fn test_repeated_add_merges_quantities() {
    let ctx = TestContext::new();
    ctx.post("/products/2/add", "variant=41&quantity=2").await;
    ctx.post("/products/2/add", "variant=41&quantity=3").await;
    assert_eq!(line_quantity(&ctx, &key(2, "41")), Some(5));
    assert_eq!(ctx.state.storefront().store().cart().len(), 1);

    let page = ctx.get("/?cart=1").await.body;
    assert!(page.contains("(5 itens)"));
}

#[tokio::test]
async fn test_add_normalizes_bad_quantity_to_one() {
    let ctx = TestContext::new();
    ctx.post("/products/4/add", "variant=M&quantity=-3").await;
    ctx.post("/products/4/add", "variant=L&quantity=abc").await;
    assert_eq!(line_quantity(&ctx, &key(4, "M")), Some(1));
    assert_eq!(line_quantity(&ctx, &key(4, "L")), Some(1));
}

#[tokio::test]
async fn test_detail_selection_is_used_for_add() {
    let ctx = TestContext::new();
    ctx.post("/products/3/view", "").await;
    let page = ctx.get("/").await.body;
    assert!(page.contains(r#"id="detailSection" aria-hidden="false""#));
    assert!(page.contains(r#"id="productSection" aria-hidden="true""#));

    let response = ctx.post("/detail/variant", "variant=XL").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    ctx.post("/products/3/add", "quantity=2").await;
    assert_eq!(line_quantity(&ctx, &key(3, "XL")), Some(2));
    assert_eq!(ctx.cart_count().await, 2);

    ctx.post("/detail/back", "").await;
    assert!(ctx.get("/").await.body.contains(r#"id="productSection" aria-hidden="false""#));
}

#[tokio::test]
async fn test_unknown_product_and_variant_are_ignored() {
    let ctx = TestContext::new();
    let response = ctx.post("/products/99/add", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    ctx.post("/products/1/add", "variant=XL").await;
    ctx.post("/products/99/view", "").await;
    assert_eq!(ctx.cart_count().await, 0);
    assert!(ctx.get("/").await.body.contains(r#"id="productSection" aria-hidden="false""#));
}

#[tokio::test]
async fn test_non_numeric_product_id_is_rejected() {
    let ctx = TestContext::new();
    let response = ctx.post("/products/abc/view", "").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Cart Lines
// =============================================================================

#[tokio::test]
async fn test_increment_and_decrement_floor() {
    let ctx = TestContext::new();
    ctx.post("/products/1/add", "variant=42").await;
    ctx.post("/cart/lines/1_42/increment", "").await;
    assert_eq!(line_quantity(&ctx, &key(1, "42")), Some(2));

    ctx.post("/cart/lines/1_42/decrement", "").await;
    ctx.post("/cart/lines/1_42/decrement", "").await;
    assert_eq!(line_quantity(&ctx, &key(1, "42")), Some(1));
}

#[tokio::test]
async fn test_direct_quantity_edit() {
    let ctx = TestContext::new();
    ctx.post("/products/4/add", "variant=XL").await;
    ctx.post("/products/4/add", "variant=S").await;

    ctx.post("/cart/lines/4_XL/quantity", "quantity=5").await;
    assert_eq!(line_quantity(&ctx, &key(4, "XL")), Some(5));

    ctx.post("/cart/lines/4_XL/quantity", "quantity=0").await;
    assert_eq!(line_quantity(&ctx, &key(4, "XL")), None);

    ctx.post("/cart/lines/4_S/quantity", "quantity=abc").await;
    assert_eq!(line_quantity(&ctx, &key(4, "S")), None);
    assert_eq!(ctx.cart_count().await, 0);
}

#[tokio::test]
async fn test_quantity_inputs_submit_without_browser_validation() {
    let ctx = TestContext::new();
    ctx.post("/products/1/view", "").await;
    let detail = ctx.get("/").await.body;
    assert!(detail.contains(r#"action="/products/1/add" class="detail-form" novalidate>"#));

    ctx.post("/products/1/add", "variant=42").await;
    ctx.post("/cart/toggle", "").await;
    let cart = ctx.get("/").await.body;
    assert!(cart.contains(r#"action="/cart/lines/1_42/quantity" novalidate>"#));
    // A single line checks out in a new tab.
    assert!(cart.contains(r#"action="/cart/checkout" target="_blank""#));
}

#[tokio::test]
async fn test_remove_line() {
    let ctx = TestContext::new();
    ctx.post("/products/2/add", "variant=40").await;
    ctx.post("/products/2/add", "variant=44").await;
    ctx.post("/cart/lines/2_40/remove", "").await;
    assert_eq!(line_quantity(&ctx, &key(2, "40")), None);
    assert_eq!(line_quantity(&ctx, &key(2, "44")), Some(1));

    // Removing a missing line is a no-op.
    let response = ctx.post("/cart/lines/2_40/remove", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_malformed_line_key_is_bad_request() {
    let ctx = TestContext::new();
    let response = ctx.post("/cart/lines/nokey/increment", "").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let response = ctx.post("/cart/lines/x_42/remove", "").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_line_checkout_redirects_to_external_link() {
    let ctx = TestContext::new();
    ctx.post("/products/1/add", "variant=40").await;
    ctx.post("/products/3/add", "variant=M").await;

    let response = ctx.post("/cart/lines/3_M/checkout", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(checkout_url(&ctx, 3).as_str()));
    // Checkout does not alter the cart.
    assert_eq!(ctx.cart_count().await, 2);
}

#[tokio::test]
async fn test_checkout_all_single_line() {
    let ctx = TestContext::new();
    ctx.post("/products/4/add", "variant=S&quantity=3").await;
    let response = ctx.post("/cart/checkout", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(checkout_url(&ctx, 4).as_str()));
}

#[tokio::test]
async fn test_checkout_all_multiple_lines_is_refused() {
    let ctx = TestContext::new();
    ctx.post("/products/1/add", "variant=40").await;
    ctx.post("/products/1/add", "variant=41").await;
    ctx.post("/cart/toggle", "").await;

    let response = ctx.post("/cart/checkout", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));

    let page = ctx.get("/").await.body;
    assert!(page.contains(MULTI_ITEM_CHECKOUT_NOTICE));
    assert_eq!(ctx.cart_count().await, 2);
}

#[tokio::test]
async fn test_checkout_all_empty_cart_is_refused() {
    let ctx = TestContext::new();
    let response = ctx.post("/cart/checkout", "").await;
    assert_eq!(response.location(), Some("/"));
    assert!(ctx.get("/").await.body.contains(MULTI_ITEM_CHECKOUT_NOTICE));
}

// =============================================================================
// Clearing
// =============================================================================

#[tokio::test]
async fn test_clear_requires_confirmation() {
    let ctx = TestContext::new();
    ctx.post("/products/2/add", "variant=39").await;
    ctx.post("/cart/toggle", "").await;

    ctx.post("/cart/clear", "").await;
    let page = ctx.get("/").await.body;
    assert!(page.contains("Tem certeza que deseja limpar o carrinho?"));

    ctx.post("/cart/clear/cancel", "").await;
    assert_eq!(ctx.cart_count().await, 1);
    assert!(!ctx.get("/").await.body.contains("Tem certeza"));

    // Confirming without a pending request does nothing.
    ctx.post("/cart/clear/confirm", "").await;
    assert_eq!(ctx.cart_count().await, 1);

    ctx.post("/cart/clear", "").await;
    ctx.post("/cart/clear/confirm", "").await;
    assert_eq!(ctx.cart_count().await, 0);
    assert!(ctx.get("/").await.body.contains("Seu carrinho está vazio."));
}

#[tokio::test]
async fn test_continue_shopping_returns_to_catalog() {
    let ctx = TestContext::new();
    ctx.post("/cart/toggle", "").await;
    ctx.post("/cart/continue", "").await;
    assert!(ctx.get("/").await.body.contains(r#"id="productSection" aria-hidden="false""#));
}
