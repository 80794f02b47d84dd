//! `Json`/`Query` extractors whose rejections render through [`ApiError`].

use axum::extract::{FromRequest, FromRequestParts};

use crate::api::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
