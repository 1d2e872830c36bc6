// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type,Authorization,Idempotency-Key,X-Request-Id";

fn origin_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= 256)
        .map(ToString::to_string)
}

fn apply_cors_headers(state: &AppState, origin: Option<&str>, headers: &mut HeaderMap) -> bool {
    let allow = if state.api.allows_any_origin() {
        Some(HeaderValue::from_static("*"))
    } else {
        origin
            .filter(|o| state.api.allows_origin(o))
            .and_then(|o| HeaderValue::from_str(o).ok())
    };
    let Some(allow) = allow else {
        return false;
    };
    headers.insert("access-control-allow-origin", allow);
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    if !state.api.allows_any_origin() {
        headers.insert("vary", HeaderValue::from_static("origin"));
    }
    true
}

pub(crate) async fn cors_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = origin_header(req.headers());
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(&state, origin.as_deref(), resp.headers_mut());
        return resp;
    }
    let mut resp = next.run(req).await;
    apply_cors_headers(&state, origin.as_deref(), resp.headers_mut());
    resp
}
