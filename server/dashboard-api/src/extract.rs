//! JSON body extractor whose rejections render as `ApiError`.

use axum::extract::FromRequest;

use crate::error::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
