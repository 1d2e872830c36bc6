// SPDX-License-Identifier: Apache-2.0

use crate::http::request_tracing::RequestTrace;
use crate::http::response_contract::api_error_response;
use crate::submit::submit_batch;
use crate::upstream::UpstreamError;
use crate::{AppState, CRATE_NAME};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Multipart, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rsia_kpi_api::{
    messages, ApiError, ApiErrorCode, ApiErrorEnvelope, KpiBatchRequest, KpiMyQuery,
    KpiUpdateForm, LoginRequest, RegisterRequest, TeamKpiRequest, UpstreamReply,
    UpstreamRequest,
};
use rsia_kpi_core::{encode, mime_for_filename, RawFile};
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::{error, warn};

fn invalid_body(rejection: &JsonRejection, request_id: &str) -> Response {
    warn!(error = %rejection, "rejected request body");
    api_error_response(
        ApiErrorEnvelope::new(
            ApiError::invalid_body(&rejection.body_text()),
            messages::INVALID_BODY,
        ),
        request_id,
    )
}

fn upstream_unavailable(err: &UpstreamError, user_message: &str, request_id: &str) -> Response {
    api_error_response(
        ApiErrorEnvelope::new(
            ApiError::new(
                ApiErrorCode::UpstreamUnavailable,
                "upstream unreachable",
                json!({"reason": err.to_string()}),
                request_id,
            ),
            user_message,
        ),
        request_id,
    )
}

/// One upstream round trip; transport failures become a 502 with `user_message`.
async fn relay(
    state: &AppState,
    request: UpstreamRequest,
    user_message: &str,
    request_id: &str,
) -> Result<UpstreamReply, Response> {
    let action = request.action();
    match state.upstream.call(&request, None).await {
        Ok(reply) => {
            let outcome = if reply.is_success() { "success" } else { "error" };
            state.metrics.observe_upstream(action, outcome).await;
            Ok(reply)
        }
        Err(err) => {
            state.metrics.observe_upstream(action, "unreachable").await;
            error!(action, error = %err, "upstream call failed");
            Err(upstream_unavailable(&err, user_message, request_id))
        }
    }
}

fn pass_through(reply: UpstreamReply) -> Response {
    Json(reply).into_response()
}

pub(crate) async fn register_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(&rejection, &trace.request_id),
    };
    if let Err(envelope) = req.validate() {
        return api_error_response(envelope, &trace.request_id);
    }
    let request = UpstreamRequest::Register {
        email: req.email,
        password: req.password,
        name: req.name,
    };
    match relay(&state, request, messages::REGISTER_FAILED, &trace.request_id).await {
        Ok(reply) => pass_through(reply),
        Err(resp) => resp,
    }
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(&rejection, &trace.request_id),
    };
    let credentials = match req.credentials() {
        Ok(credentials) => credentials,
        Err(envelope) => return api_error_response(envelope, &trace.request_id),
    };
    let request = UpstreamRequest::Login {
        email: credentials.email,
        password: credentials.password,
    };
    match relay(&state, request, messages::LOGIN_FAILED, &trace.request_id).await {
        Ok(reply) => pass_through(reply),
        Err(resp) => resp,
    }
}

pub(crate) async fn kpi_batch_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    headers: HeaderMap,
    body: Result<Json<KpiBatchRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(&rejection, &trace.request_id),
    };
    let idempotency_key = headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    match submit_batch(state.upstream.as_ref(), req, idempotency_key).await {
        Ok(ack) => {
            state.metrics.observe_upstream("kpiBatch", "success").await;
            pass_through(ack.reply)
        }
        Err(err) => {
            if let crate::SubmitError::Forward(forward) = &err {
                let outcome = match forward {
                    crate::ForwardError::NetworkError { .. } => "unreachable",
                    crate::ForwardError::RejectedByUpstream { .. } => "error",
                };
                state.metrics.observe_upstream("kpiBatch", outcome).await;
            }
            api_error_response(err.to_envelope(), &trace.request_id)
        }
    }
}

pub(crate) async fn indicator_data_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
) -> Response {
    match relay(
        &state,
        UpstreamRequest::GetIndicatorData,
        messages::INDICATORS_FAILED,
        &trace.request_id,
    )
    .await
    {
        Ok(reply) => pass_through(reply),
        Err(resp) => resp,
    }
}

pub(crate) async fn kpi_my_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    Query(query): Query<KpiMyQuery>,
) -> Response {
    let email = match query.email() {
        Ok(email) => email.to_string(),
        Err(envelope) => return api_error_response(envelope, &trace.request_id),
    };
    match relay(
        &state,
        UpstreamRequest::GetKpiByUser { email },
        messages::KPI_MY_FAILED,
        &trace.request_id,
    )
    .await
    {
        Ok(reply) => pass_through(reply),
        Err(resp) => resp,
    }
}

fn multipart_error(reason: &str, request_id: &str) -> Response {
    warn!(reason, "rejected multipart form");
    api_error_response(
        ApiErrorEnvelope::new(ApiError::invalid_body(reason), messages::INVALID_BODY),
        request_id,
    )
}

pub(crate) async fn kpi_update_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    mut multipart: Multipart,
) -> Response {
    let mut form = KpiUpdateForm::default();
    let mut evidence_file: Option<RawFile> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_error(&e.body_text(), &trace.request_id),
        };
        let name = field.name().unwrap_or_default().to_string();
        if name == "buktiFile" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let mime_type = field
                .content_type()
                .map(ToString::to_string)
                .filter(|m| m != "application/octet-stream")
                .or_else(|| mime_for_filename(&filename).map(ToString::to_string))
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let bytes = match field.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => return multipart_error(&e.body_text(), &trace.request_id),
            };
            if !bytes.is_empty() {
                evidence_file = Some(RawFile::new(&filename, &mime_type, bytes.to_vec()));
            }
            continue;
        }
        let value = match field.text().await {
            Ok(value) => value,
            Err(e) => return multipart_error(&e.body_text(), &trace.request_id),
        };
        match name.as_str() {
            "kpiKey" => form.kpi_key = value,
            "email" => form.email = value,
            "actual" => form.actual = Some(value),
            _ => {}
        }
    }
    if let Err(envelope) = form.validate() {
        return api_error_response(envelope, &trace.request_id);
    }
    let bukti = match evidence_file.as_ref().map(encode).transpose() {
        Ok(evidence) => evidence.map(|e| e.to_data_uri()).unwrap_or_default(),
        Err(err) => {
            warn!(error = %err, "rejected evidence file");
            return api_error_response(ApiErrorEnvelope::from(&err), &trace.request_id);
        }
    };
    let request = UpstreamRequest::UpdateKpi {
        id: form.kpi_key,
        actual: form.actual,
        email: form.email,
        bukti,
    };
    match relay(&state, request, messages::KPI_UPDATE_FAILED, &trace.request_id).await {
        Ok(reply) => pass_through(reply),
        Err(resp) => resp,
    }
}

pub(crate) async fn team_kpi_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    body: Result<Json<TeamKpiRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(&rejection, &trace.request_id),
    };
    let nama = match req.viewer_name() {
        Ok(nama) => nama,
        Err(envelope) => return api_error_response(envelope, &trace.request_id),
    };
    match relay(
        &state,
        UpstreamRequest::GetTeamKpi { nama },
        messages::TEAM_KPI_SERVER_FAILED,
        &trace.request_id,
    )
    .await
    {
        Ok(reply) if reply.is_success() => pass_through(reply),
        Ok(reply) => {
            let reply = if reply.result.is_empty() && reply.message.is_null() {
                UpstreamReply::error(messages::TEAM_KPI_FAILED)
            } else {
                reply
            };
            (StatusCode::BAD_REQUEST, Json(reply)).into_response()
        }
        Err(resp) => resp,
    }
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.accepting_requests.load(Ordering::Relaxed) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready")
    }
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.metrics.render().await;
    let mut response = (StatusCode::OK, body).into_response();
    response.headers_mut().insert(
        "content-type",
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    response
}

pub(crate) async fn version_handler(State(state): State<AppState>) -> impl IntoResponse {
    let payload = json!({
        "service": {
            "name": "rsia-kpi",
            "version": env!("CARGO_PKG_VERSION"),
            "build_hash": option_env!("RSIA_BUILD_HASH").unwrap_or("dev"),
        },
        "server": {
            "crate": CRATE_NAME,
            "config_schema_version": crate::config::CONFIG_SCHEMA_VERSION,
            "api_contract_version": rsia_kpi_api::API_CONTRACT_VERSION,
            "upstream_backend": state.upstream.backend_tag(),
        }
    });
    let mut response = Json(payload).into_response();
    response
        .headers_mut()
        .insert("cache-control", HeaderValue::from_static("public, max-age=30"));
    response
}

pub(crate) async fn openapi_handler() -> impl IntoResponse {
    Json(rsia_kpi_api::openapi::openapi_v1_spec())
}
