//! Extractors that report malformed requests with the application's error body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// A JSON request body.
///
/// Bad syntax, missing fields, unknown fields and wrong types are all
/// reported as [Error::Validation].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// A URL query string, reported as [Error::Validation] if it cannot be parsed.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);
