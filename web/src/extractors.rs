//! Header extractors for the Actions API.
//!
//! - [`TouchpointId`]: the calling touchpoint, required on every action route
//! - [`ApiUrl`]: the public base URL used in notifications, required on POST
//! - [`ResourceBaseUrl`]: `apimurl` when present, otherwise derived from the
//!   request's own scheme and host
//!
//! Missing required headers are rejected with 400 before the body is read.

use crate::error::AppError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

/// Header carrying the touchpoint identifier.
pub const TOUCHPOINT_ID_HEADER: &str = "TouchpointId";

/// Header carrying the public API base URL.
pub const API_URL_HEADER: &str = "apimurl";

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Touchpoint identifier from the `TouchpointId` header.
///
/// # Example
///
/// ```ignore
/// async fn handler(TouchpointId(touchpoint): TouchpointId) -> String {
///     format!("Called by {touchpoint}")
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchpointId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for TouchpointId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_value(&parts.headers, TOUCHPOINT_ID_HEADER)
            .map(|value| Self(value.to_string()))
            .ok_or_else(|| {
                tracing::info!("Request rejected: missing TouchpointId header");
                AppError::bad_request("Unable to locate 'TouchpointId' in request header")
            })
    }
}

/// Public API base URL from the `apimurl` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrl(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ApiUrl
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_value(&parts.headers, API_URL_HEADER)
            .map(|value| Self(value.to_string()))
            .ok_or_else(|| {
                tracing::info!("Request rejected: missing apimurl header");
                AppError::bad_request("Unable to locate 'apimurl' in request header")
            })
    }
}

/// Base URL for resource links: `apimurl` if sent, else `{scheme}://{host}/api`.
///
/// The scheme is taken from `X-Forwarded-Proto`, then the request URI,
/// defaulting to `http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBaseUrl(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ResourceBaseUrl
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(api_url) = header_value(&parts.headers, API_URL_HEADER) {
            return Ok(Self(api_url.to_string()));
        }

        let scheme = header_value(&parts.headers, "X-Forwarded-Proto")
            .or_else(|| parts.uri.scheme_str())
            .unwrap_or("http");
        let host = header_value(&parts.headers, header::HOST.as_str())
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost");

        Ok(Self(format!("{scheme}://{host}/api")))
    }
}
