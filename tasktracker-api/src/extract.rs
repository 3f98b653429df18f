/// Extractors whose rejections use the API error format
///
/// axum's stock `Json` and `Path` reject with plain-text bodies; these
/// wrappers route the rejection through [`ApiError`] instead.

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
