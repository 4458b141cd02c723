//! Frame-embedding relay.
//!
//! Streams an upstream response through unchanged except for the headers
//! that would stop the browser from framing it.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::metrics::PROXY_REQUESTS_TOTAL;
use crate::state::AppState;

/// Upstream headers never forwarded.
const STRIPPED_HEADERS: &[&str] = &[
    "x-frame-options",
    "content-security-policy",
    "x-content-security-policy",
    "connection",
    "keep-alive",
    "transfer-encoding",
];

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

/// GET /api/proxy?url=
pub async fn proxy(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProxyParams>,
) -> Response {
    let Some(target) = params.url.filter(|u| !u.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "URL parameter required").into_response();
    };

    info!(url = %target, "Proxying");
    let referer = format!(
        "{}/",
        state.config().listing.base_url.trim_end_matches('/')
    );

    let upstream = state
        .proxy_client()
        .get(target.trim())
        .header(header::REFERER, referer)
        .send()
        .await
        .and_then(|resp| resp.error_for_status());

    let resp = match upstream {
        Ok(resp) => resp,
        Err(e) => {
            warn!(url = %target, error = %e, "Proxy error");
            PROXY_REQUESTS_TOTAL.with_label_values(&["error"]).inc();
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Proxy error: {}", e),
            )
                .into_response();
        }
    };
    PROXY_REQUESTS_TOTAL.with_label_values(&["ok"]).inc();

    let status = resp.status();
    let mut headers = HeaderMap::new();
    for (name, value) in resp.headers() {
        if STRIPPED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );

    (status, headers, Body::from_stream(resp.bytes_stream())).into_response()
}
