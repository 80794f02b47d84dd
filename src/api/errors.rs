//! HTTP error mapping. Everything renders as `{"error": code, "message": text}`
//! except the catalog/location lookups, which keep their bare `{"error": text}`
//! bodies.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::aggregates::{CartError, RoleError};
use crate::pricing::CheckoutBlocker;
use crate::storefront::{AddRefusal, CheckoutError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found")]
    CatalogNotFound,
    #[error("{0} is required")]
    MissingParam(&'static str),
    #[error("{message}")]
    BadRequest { status: StatusCode, message: String },
    #[error("Session not found")]
    SessionNotFound,
    #[error("Product not found")]
    ProductNotFound,
    #[error(transparent)]
    Role(#[from] RoleError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Blocked(#[from] CheckoutBlocker),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error(transparent)]
    AddRefused(#[from] AddRefusal),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest { status: rejection.status(), message: rejection.body_text() }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": code, "message": message.into() }))).into_response()
}

fn bare_error(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::CatalogNotFound => bare_error(StatusCode::NOT_FOUND, message),
            ApiError::MissingParam(_) => bare_error(StatusCode::BAD_REQUEST, message),
            ApiError::BadRequest { status, .. } => json_error(status, "bad_request", message),
            ApiError::SessionNotFound => json_error(StatusCode::NOT_FOUND, "session_not_found", message),
            ApiError::ProductNotFound => json_error(StatusCode::NOT_FOUND, "product_not_found", message),
            ApiError::Role(RoleError::NotAuthenticated) => json_error(StatusCode::UNAUTHORIZED, "not_authenticated", message),
            ApiError::Role(RoleError::ProtectedBadge(_)) => json_error(StatusCode::CONFLICT, "protected_badge", message),
            ApiError::Role(RoleError::UnknownBadge(_)) => json_error(StatusCode::BAD_REQUEST, "unknown_badge", message),
            ApiError::Cart(CartError::ItemNotFound) => json_error(StatusCode::NOT_FOUND, "item_not_found", message),
            ApiError::Cart(_) => json_error(StatusCode::BAD_REQUEST, "invalid_cart_item", message),
            ApiError::Blocked(CheckoutBlocker::NotAuthenticated) | ApiError::Checkout(CheckoutError::NotAuthenticated) => {
                json_error(StatusCode::UNAUTHORIZED, "not_authenticated", message)
            }
            ApiError::Blocked(blocker) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                axum::Json(json!({ "error": "checkout_blocked", "message": message, "blockers": [blocker] })),
            )
                .into_response(),
            ApiError::Checkout(CheckoutError::Blocked(blockers)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                axum::Json(json!({
                    "error": "checkout_blocked",
                    "message": message,
                    "blockers": blockers,
                    "reasons": blockers.iter().map(ToString::to_string).collect::<Vec<_>>(),
                })),
            )
                .into_response(),
            ApiError::Checkout(CheckoutError::InvalidForm(issues)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                axum::Json(json!({ "error": "invalid_form", "message": message, "issues": issues })),
            )
                .into_response(),
            ApiError::Checkout(CheckoutError::Order(_)) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "order_rejected", message),
            ApiError::AddRefused(_) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "cannot_add", message),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
