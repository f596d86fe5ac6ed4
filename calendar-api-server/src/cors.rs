//! Origin allow-list and CORS response headers.

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::config::Config;
use crate::routes::AppError;
use crate::state::AppState;

const ALLOW_METHODS: &str = "GET,POST,OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";

/// A single allowed browser origin.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origin: HeaderValue,
}

impl CorsPolicy {
    pub fn new(allowed_origin: HeaderValue) -> Self {
        CorsPolicy { allowed_origin }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let allowed_origin = HeaderValue::from_str(&config.allowed_origin).with_context(|| {
            format!(
                "ALLOWED_ORIGIN is not a valid header value: {}",
                config.allowed_origin
            )
        })?;
        Ok(Self::new(allowed_origin))
    }

    /// `Access-Control-Allow-Origin` for a request, or `None` when its origin is not allowed.
    ///
    /// Requests without an `Origin` header count as same-origin.
    pub fn allow_origin(&self, headers: &HeaderMap) -> Option<HeaderValue> {
        match headers.get(ORIGIN) {
            None => Some(self.allowed_origin.clone()),
            Some(origin) if origin.is_empty() => Some(self.allowed_origin.clone()),
            Some(origin) if *origin == self.allowed_origin => Some(origin.clone()),
            Some(_) => None,
        }
    }
}

fn apply_cors_headers(headers: &mut HeaderMap, allow_origin: HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

/// Answers preflights, rejects foreign origins, and decorates everything else
/// except internal failures with CORS headers.
pub async fn origin_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let allow_origin = state.cors.allow_origin(request.headers());

    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        if let Some(allow_origin) = allow_origin {
            apply_cors_headers(response.headers_mut(), allow_origin);
        }
        return response;
    }

    let Some(allow_origin) = allow_origin else {
        warn!(
            origin = ?request.headers().get(ORIGIN),
            path = %request.uri().path(),
            "rejected request from disallowed origin"
        );
        return AppError::Forbidden.into_response();
    };

    let mut response = next.run(request).await;
    if response.status() != StatusCode::INTERNAL_SERVER_ERROR {
        apply_cors_headers(response.headers_mut(), allow_origin);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CorsPolicy {
        CorsPolicy::new(HeaderValue::from_static("https://calendar.example"))
    }

    fn with_origin(origin: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_static(origin));
        headers
    }

    #[test]
    fn test_absent_origin_gets_configured_origin() {
        assert_eq!(
            policy().allow_origin(&HeaderMap::new()).unwrap(),
            "https://calendar.example"
        );
        assert_eq!(
            policy().allow_origin(&with_origin("")).unwrap(),
            "https://calendar.example"
        );
    }

    #[test]
    fn test_allowed_origin_is_echoed() {
        assert_eq!(
            policy()
                .allow_origin(&with_origin("https://calendar.example"))
                .unwrap(),
            "https://calendar.example"
        );
    }

    #[test]
    fn test_other_origins_are_rejected() {
        assert!(policy().allow_origin(&with_origin("https://evil.example")).is_none());
        assert!(policy()
            .allow_origin(&with_origin("https://calendar.example.evil.example"))
            .is_none());
        assert!(policy().allow_origin(&with_origin("http://calendar.example")).is_none());
    }

    #[test]
    fn test_from_config_rejects_unprintable_origin() {
        let mut config = crate::config::test_config();
        config.allowed_origin = "https://calendar.example\n".to_string();
        assert!(CorsPolicy::from_config(&config).is_err());
    }
}
