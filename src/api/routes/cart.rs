//! Cart page, snapshot persistence and checkout.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::routes::session_handle;
use crate::api::{ApiJson, ApiResult, AppState};
use crate::domain::aggregates::{Cart, CartSnapshot, Order};
use crate::storefront::{place_order, CartView, CheckoutForm, CheckoutSummary, Session};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/sessions/:id/cart", get(get_cart).delete(clear_cart))
        .route("/api/v1/sessions/:id/cart/items", post(add_item).put(set_quantity).delete(remove_item))
        .route("/api/v1/sessions/:id/cart/snapshot", get(get_snapshot).put(restore_snapshot))
        .route("/api/v1/sessions/:id/cart/checkout", post(proceed))
        .route("/api/v1/sessions/:id/checkout", get(checkout_summary).post(checkout))
}

fn cart_view(s: &AppState, session: &Session) -> CartView {
    CartView::build(&s.catalog, session.cart(), session.shopper(), &s.config.currency)
}

async fn get_cart(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<CartView>> {
    let session = session_handle(&s, &id).await?;
    let guard = session.lock().await;
    Ok(Json(cart_view(&s, &guard)))
}

async fn clear_cart(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<CartView>> {
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    guard.cart_mut().clear();
    guard.flush_events();
    Ok(Json(cart_view(&s, &guard)))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: Option<u32>,
}

async fn add_item(State(s): State<AppState>, Path(id): Path<String>, ApiJson(r): ApiJson<AddItemRequest>) -> ApiResult<(StatusCode, Json<CartView>)> {
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    guard.cart_mut().add_item(&r.product_id, r.variant_id.as_deref(), r.quantity.unwrap_or(1))?;
    guard.flush_events();
    Ok((StatusCode::CREATED, Json(cart_view(&s, &guard))))
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: i64,
}

async fn set_quantity(State(s): State<AppState>, Path(id): Path<String>, ApiJson(r): ApiJson<SetQuantityRequest>) -> ApiResult<Json<CartView>> {
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    let applied = guard.set_cart_quantity(&s.catalog, &r.product_id, r.variant_id.as_deref(), r.quantity)?;
    tracing::debug!(session = %id, product_id = %r.product_id, requested = r.quantity, applied, "quantity set");
    guard.flush_events();
    Ok(Json(cart_view(&s, &guard)))
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub product_id: String,
    pub variant_id: Option<String>,
}

async fn remove_item(State(s): State<AppState>, Path(id): Path<String>, ApiJson(r): ApiJson<RemoveItemRequest>) -> ApiResult<Json<CartView>> {
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    guard.cart_mut().remove_item(&r.product_id, r.variant_id.as_deref())?;
    guard.flush_events();
    Ok(Json(cart_view(&s, &guard)))
}

async fn get_snapshot(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<CartSnapshot>> {
    let session = session_handle(&s, &id).await?;
    let snapshot = session.lock().await.cart().snapshot();
    Ok(Json(snapshot))
}

/// Accepts any JSON; unusable lines are dropped.
async fn restore_snapshot(State(s): State<AppState>, Path(id): Path<String>, ApiJson(raw): ApiJson<serde_json::Value>) -> ApiResult<Json<CartView>> {
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    guard.replace_cart(Cart::restore(&raw));
    guard.flush_events();
    Ok(Json(cart_view(&s, &guard)))
}

#[derive(Debug, Serialize)]
pub struct ProceedResponse {
    pub proceed: bool,
    pub next: &'static str,
}

/// "Proceed to checkout" from the cart page.
async fn proceed(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ProceedResponse>> {
    let session = session_handle(&s, &id).await?;
    let guard = session.lock().await;
    cart_view(&s, &guard).proceed()?;
    Ok(Json(ProceedResponse { proceed: true, next: "checkout" }))
}

async fn checkout_summary(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<CheckoutSummary>> {
    let session = session_handle(&s, &id).await?;
    let guard = session.lock().await;
    Ok(Json(CheckoutSummary::build(&s.catalog, &s.locations, &guard, &s.config.currency, &s.config.default_country)))
}

async fn checkout(State(s): State<AppState>, Path(id): Path<String>, ApiJson(form): ApiJson<CheckoutForm>) -> ApiResult<(StatusCode, Json<Order>)> {
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    let order = place_order(&s.catalog, &s.locations, &mut guard, &form, &s.config.currency, Utc::now())?;
    Ok((StatusCode::CREATED, Json(order)))
}
