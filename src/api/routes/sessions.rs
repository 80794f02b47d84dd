//! Session lifecycle, the role switcher and the per-session store and product
//! pages.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::routes::session_handle;
use crate::api::{ApiError, ApiJson, ApiQuery, ApiResult, AppState};
use crate::domain::aggregates::{Badge, BaseRole, Capability, RoleState};
use crate::storefront::{add_selection, CartView, ProductView, Selection, SessionSummary, StoreView};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/v1/sessions/:id/role", get(get_role).put(set_base_role))
        .route("/api/v1/sessions/:id/role/upgrade", post(upgrade_to_member))
        .route("/api/v1/sessions/:id/login", post(login))
        .route("/api/v1/sessions/:id/logout", post(logout))
        .route("/api/v1/sessions/:id/badges/:badge", put(set_badge))
        .route("/api/v1/sessions/:id/badges/:badge/toggle", post(toggle_badge))
        .route("/api/v1/sessions/:id/store", get(store))
        .route("/api/v1/sessions/:id/products/:slug", get(product_page))
        .route("/api/v1/sessions/:id/products/:slug/add", post(add_to_cart))
}

// =============================================================================
// Sessions
// =============================================================================

async fn create_session(State(s): State<AppState>) -> ApiResult<(StatusCode, Json<SessionSummary>)> {
    let id = s.sessions.create().await;
    let session = session_handle(&s, &id).await?;
    let summary = session.lock().await.summary();
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn get_session(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<SessionSummary>> {
    let session = session_handle(&s, &id).await?;
    let summary = session.lock().await.summary();
    Ok(Json(summary))
}

async fn delete_session(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    if s.sessions.remove(&id).await {
        tracing::info!(session = %id, "session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound)
    }
}

// =============================================================================
// Role switcher
// =============================================================================

#[derive(Debug, Serialize)]
pub struct RoleView {
    pub session_label: String,
    pub authenticated: bool,
    pub base_role: BaseRole,
    pub badges: Vec<Badge>,
    pub capabilities: Vec<Capability>,
    pub can_see_wholesale: bool,
}

impl From<&RoleState> for RoleView {
    fn from(role: &RoleState) -> Self {
        Self {
            session_label: role.session_label(),
            authenticated: role.is_authenticated(),
            base_role: role.base_role(),
            badges: role.badges().iter().copied().collect(),
            capabilities: role.capabilities(),
            can_see_wholesale: role.can_see_wholesale(),
        }
    }
}

async fn get_role(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<RoleView>> {
    let session = session_handle(&s, &id).await?;
    let guard = session.lock().await;
    Ok(Json(RoleView::from(guard.role())))
}

async fn login(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<RoleView>> {
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    guard.role_mut().login();
    guard.flush_events();
    Ok(Json(RoleView::from(guard.role())))
}

async fn logout(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<RoleView>> {
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    guard.role_mut().logout();
    guard.flush_events();
    Ok(Json(RoleView::from(guard.role())))
}

#[derive(Debug, Deserialize)] pub struct BaseRoleRequest { pub base_role: BaseRole }

async fn set_base_role(State(s): State<AppState>, Path(id): Path<String>, ApiJson(r): ApiJson<BaseRoleRequest>) -> ApiResult<Json<RoleView>> {
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    guard.role_mut().set_base_role(r.base_role)?;
    guard.flush_events();
    Ok(Json(RoleView::from(guard.role())))
}

async fn upgrade_to_member(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<RoleView>> {
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    guard.role_mut().auto_upgrade_to_member();
    guard.flush_events();
    Ok(Json(RoleView::from(guard.role())))
}

#[derive(Debug, Deserialize)] pub struct BadgeRequest { pub enabled: bool }

async fn set_badge(State(s): State<AppState>, Path((id, badge)): Path<(String, String)>, ApiJson(r): ApiJson<BadgeRequest>) -> ApiResult<Json<RoleView>> {
    let badge: Badge = badge.parse()?;
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    let result = guard.role_mut().set_badge(badge, r.enabled);
    // the refusal event is logged even when the change is rejected
    guard.flush_events();
    result?;
    Ok(Json(RoleView::from(guard.role())))
}

async fn toggle_badge(State(s): State<AppState>, Path((id, badge)): Path<(String, String)>) -> ApiResult<Json<RoleView>> {
    let badge: Badge = badge.parse()?;
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    let result = guard.role_mut().toggle_badge(badge);
    guard.flush_events();
    result?;
    Ok(Json(RoleView::from(guard.role())))
}

// =============================================================================
// Store and product pages
// =============================================================================

async fn store(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<StoreView>> {
    let session = session_handle(&s, &id).await?;
    let guard = session.lock().await;
    Ok(Json(StoreView::build(&s.catalog, &guard, &s.config.currency)))
}

async fn product_page(
    State(s): State<AppState>,
    Path((id, slug)): Path<(String, String)>,
    ApiQuery(selection): ApiQuery<Selection>,
) -> ApiResult<Json<ProductView>> {
    let product = s.catalog.find_by_slug(&slug).ok_or(ApiError::ProductNotFound)?;
    let session = session_handle(&s, &id).await?;
    let guard = session.lock().await;
    let view = ProductView::build(product, guard.cart(), guard.shopper(), guard.role().session_label(), &selection, &s.config.currency);
    Ok(Json(view))
}

#[derive(Debug, Serialize)]
pub struct AddedToCart {
    pub variant_id: Option<String>,
    pub cart: CartView,
}

async fn add_to_cart(
    State(s): State<AppState>,
    Path((id, slug)): Path<(String, String)>,
    ApiJson(selection): ApiJson<Selection>,
) -> ApiResult<(StatusCode, Json<AddedToCart>)> {
    let product = s.catalog.find_by_slug(&slug).ok_or(ApiError::ProductNotFound)?;
    let session = session_handle(&s, &id).await?;
    let mut guard = session.lock().await;
    let shopper = guard.shopper();
    let variant_id = add_selection(product, guard.cart_mut(), shopper, &selection)?;
    guard.flush_events();
    let cart = CartView::build(&s.catalog, guard.cart(), shopper, &s.config.currency);
    Ok((StatusCode::CREATED, Json(AddedToCart { variant_id, cart })))
}
