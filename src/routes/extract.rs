//! Extractors whose rejections render through the crate error types, so
//! malformed bodies, paths and queries are all plain 400s.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::{AuthFailure, Error};

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AuthFailure))]
pub struct AuthJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);
