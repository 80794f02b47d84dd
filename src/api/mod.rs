//! HTTP surface: the static catalog/location API plus session-scoped
//! storefront endpoints.

pub mod errors;
pub mod extract;
pub mod routes;

use axum::{routing::get, Json, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::{Catalog, Locations};
use crate::config::Config;
use crate::storefront::SessionStore;

pub use errors::{ApiError, ApiResult};
pub use extract::{ApiJson, ApiQuery};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub locations: Arc<Locations>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Built-in catalog and location tables, no sessions yet.
    pub fn new(config: Config) -> Self {
        Self {
            catalog: Arc::new(Catalog::builtin()),
            locations: Arc::new(Locations::builtin()),
            sessions: Arc::new(SessionStore::new()),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "principle-storefront"})) }))
        .merge(routes::catalog::router())
        .merge(routes::sessions::router())
        .merge(routes::cart::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        send(app, method, uri, None).await
    }

    async fn send(app: Router, method: &str, uri: &str, json: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match json {
            Some(v) => builder.header("content-type", "application/json").body(Body::from(v.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    fn app() -> Router { router(AppState::new(Config::default())) }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(app(), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "principle-storefront");
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let (status, body) = call(app(), "GET", "/api/products/principle-cap-minimal").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "P-003");
        assert_eq!(body["moqWholesale"], 12);

        let (status, body) = call(app(), "GET", "/api/products/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn test_location_params() {
        let (status, body) = call(app(), "GET", "/api/locations/provinces").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "country is required"}));

        let (status, body) = call(app(), "GET", "/api/locations/cities?province=Bali").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(["Denpasar", "Badung"]));

        let (_, body) = call(app(), "GET", "/api/locations/provinces?country=FR").await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_placeholder_is_svg() {
        let req = Request::builder().uri("/media/placeholder.svg?label=Tee&bg=%23111827").body(Body::empty()).unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.headers()["content-type"], "image/svg+xml");
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("fill=\"#111827\""));
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let (status, body) = call(app(), "GET", "/api/v1/sessions/missing/cart").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "session_not_found");
    }

    #[tokio::test]
    async fn test_malformed_input_renders_json_error() {
        let app = app();
        let (_, session) = call(app.clone(), "POST", "/api/v1/sessions").await;
        let id = session["id"].as_str().unwrap().to_string();
        call(app.clone(), "POST", &format!("/api/v1/sessions/{id}/login")).await;

        let role = serde_json::json!({"base_role": "admin"});
        let (status, body) = send(app.clone(), "PUT", &format!("/api/v1/sessions/{id}/role"), Some(role)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].as_str().unwrap().contains("base_role"));

        let item = serde_json::json!({"product_id": "P-001", "quantity": -1});
        let (status, body) = send(app.clone(), "POST", &format!("/api/v1/sessions/{id}/cart/items"), Some(item)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "bad_request");

        let (status, body) = call(app.clone(), "GET", &format!("/api/v1/sessions/{id}/products/principle-cap-minimal?quantity=lots")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");

        let req = Request::builder().method("PUT").uri(format!("/api/v1/sessions/{id}/badges/retailer")).body(Body::from("{}")).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "bad_request");
    }
}
