//! API key authentication for the HTTP transport.
//!
//! Accepted credentials, checked in constant time:
//! - `Authorization: Bearer <token>` when a bearer token is configured
//! - `X-API-Key: <key>` header
//! - `?api_key=<key>` query parameter
//!
//! When no API key is configured a 32-byte URL-safe key is generated at
//! start-up and logged once, so a local client can be pointed at it.

use std::fmt;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use serde::Serialize;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Query parameter carrying the API key.
pub const API_KEY_QUERY_PARAM: &str = "api_key";

/// Random bytes in a generated API key.
const GENERATED_KEY_BYTES: usize = 32;

/// Why a request was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing API key: send X-API-Key, ?api_key=, or Authorization: Bearer")]
    MissingCredentials,

    #[error("Invalid API key or bearer token")]
    InvalidCredentials,
}

impl AuthError {
    fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidCredentials => "invalid_credentials",
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Generate a fresh API key: 32 random bytes, base64-url encoded without padding.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; GENERATED_KEY_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn constant_time_eq(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Credentials accepted by the HTTP transport.
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Arc<str>,
    bearer_token: Option<Arc<str>>,
}

impl fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &"[REDACTED]")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiKeyAuth {
    pub fn new(api_key: impl Into<String>, bearer_token: Option<String>) -> Self {
        Self {
            api_key: Arc::from(api_key.into()),
            bearer_token: bearer_token.filter(|t| !t.is_empty()).map(Arc::from),
        }
    }

    /// Use the configured key, or generate one and log it.
    pub fn from_config(api_key: Option<String>, bearer_token: Option<String>) -> Self {
        let key = match api_key.filter(|k| !k.is_empty()) {
            Some(key) => key,
            None => {
                let key = generate_api_key();
                tracing::warn!(
                    api_key = %key,
                    "No THINGS_MCP_API_KEY set, generated a temporary key; set THINGS_MCP_API_KEY to persist it"
                );
                key
            }
        };
        Self::new(key, bearer_token)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_bearer_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Check the request's headers and query string.
    pub fn check(&self, headers: &HeaderMap, query: Option<&str>) -> Result<(), AuthError> {
        let mut presented = false;

        if let Some(token) = bearer_token(headers) {
            presented = true;
            if let Some(expected) = &self.bearer_token {
                if constant_time_eq(token, expected) {
                    return Ok(());
                }
            }
        }

        let key = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| query.and_then(api_key_from_query));
        if let Some(key) = key {
            presented = true;
            if constant_time_eq(&key, &self.api_key) {
                return Ok(());
            }
        }

        if presented {
            Err(AuthError::InvalidCredentials)
        } else {
            Err(AuthError::MissingCredentials)
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

fn api_key_from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == API_KEY_QUERY_PARAM)
        .map(|(_, v)| v.into_owned())
}

/// Axum middleware rejecting unauthenticated requests with 401.
pub async fn require_auth(
    State(auth): State<ApiKeyAuth>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if let Err(e) = auth.check(request.headers(), request.uri().query()) {
        tracing::warn!(error = %e, path = %request.uri().path(), "Rejected HTTP request");
        return Err(e);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_generated_keys_are_url_safe_and_unique() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_header_and_query_keys() {
        let auth = ApiKeyAuth::new("secret", None);

        assert!(auth.check(&headers(&[("x-api-key", "secret")]), None).is_ok());
        assert!(auth.check(&HeaderMap::new(), Some("api_key=secret&x=1")).is_ok());
        assert_eq!(
            auth.check(&headers(&[("x-api-key", "wrong")]), None),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            auth.check(&HeaderMap::new(), Some("other=1")),
            Err(AuthError::MissingCredentials)
        );
    }

    #[test]
    fn test_bearer_only_when_configured() {
        let without = ApiKeyAuth::new("secret", None);
        let bearer = headers(&[("authorization", "Bearer tok")]);
        assert_eq!(without.check(&bearer, None), Err(AuthError::InvalidCredentials));

        let with = ApiKeyAuth::new("secret", Some("tok".into()));
        assert!(with.check(&bearer, None).is_ok());
        assert!(with.has_bearer_token());
        assert_eq!(
            with.check(&headers(&[("authorization", "Bearer nope")]), None),
            Err(AuthError::InvalidCredentials)
        );
        // The API key still works alongside a bearer token.
        assert!(with.check(&headers(&[("x-api-key", "secret")]), None).is_ok());
    }

    #[test]
    fn test_from_config_generates_when_missing() {
        let auth = ApiKeyAuth::from_config(None, None);
        assert_eq!(auth.api_key().len(), 43);

        let auth = ApiKeyAuth::from_config(Some("fixed".into()), None);
        assert_eq!(auth.api_key(), "fixed");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let auth = ApiKeyAuth::new("secret", Some("tok".into()));
        let debug = format!("{auth:?}");
        assert!(!debug.contains("secret"));
        assert!(!debug.contains("tok\""));
    }
}
