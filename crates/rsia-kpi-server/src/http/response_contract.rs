// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rsia_kpi_api::error_mapping::map_error;
use rsia_kpi_api::ApiErrorEnvelope;

/// Renders an error envelope with the status its code maps to.
#[must_use]
pub(crate) fn api_error_response(envelope: ApiErrorEnvelope, request_id: &str) -> Response {
    let envelope = envelope.with_request_id(request_id);
    let status = StatusCode::from_u16(map_error(&envelope.error).status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope)).into_response()
}
