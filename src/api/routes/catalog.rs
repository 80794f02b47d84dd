//! Read-only catalog, location and media endpoints.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::{ApiError, ApiQuery, ApiResult, AppState};
use crate::catalog::Country;
use crate::domain::aggregates::Product;
use crate::media;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/:slug", get(get_product))
        .route("/api/locations/countries", get(list_countries))
        .route("/api/locations/provinces", get(list_provinces))
        .route("/api/locations/cities", get(list_cities))
        .route(media::PLACEHOLDER_PATH, get(placeholder))
}

async fn list_products(State(s): State<AppState>) -> Json<Vec<Product>> {
    Json(s.catalog.products().to_vec())
}

async fn get_product(State(s): State<AppState>, Path(slug): Path<String>) -> ApiResult<Json<Product>> {
    s.catalog.find_by_slug(&slug).cloned().map(Json).ok_or(ApiError::CatalogNotFound)
}

async fn list_countries(State(s): State<AppState>) -> Json<Vec<Country>> {
    Json(s.locations.countries().to_vec())
}

#[derive(Debug, Deserialize)] pub struct ProvinceParams { pub country: Option<String> }
#[derive(Debug, Deserialize)] pub struct CityParams { pub province: Option<String> }

/// Blank counts as missing.
fn required(value: Option<String>, name: &'static str) -> ApiResult<String> {
    value.filter(|v| !v.trim().is_empty()).ok_or(ApiError::MissingParam(name))
}

async fn list_provinces(State(s): State<AppState>, ApiQuery(p): ApiQuery<ProvinceParams>) -> ApiResult<Json<Vec<String>>> {
    let country = required(p.country, "country")?;
    Ok(Json(s.locations.provinces(country.trim()).to_vec()))
}

async fn list_cities(State(s): State<AppState>, ApiQuery(p): ApiQuery<CityParams>) -> ApiResult<Json<Vec<String>>> {
    let province = required(p.province, "province")?;
    Ok(Json(s.locations.cities(province.trim()).to_vec()))
}

#[derive(Debug, Deserialize)] pub struct PlaceholderParams { pub label: Option<String>, pub bg: Option<String>, pub fg: Option<String> }

async fn placeholder(ApiQuery(p): ApiQuery<PlaceholderParams>) -> impl IntoResponse {
    let svg = media::render_placeholder(
        p.label.as_deref().unwrap_or("PRINCIPLE"),
        p.bg.as_deref().unwrap_or(media::DEFAULT_BG),
        p.fg.as_deref().unwrap_or(media::DEFAULT_FG),
    );
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg)
}
