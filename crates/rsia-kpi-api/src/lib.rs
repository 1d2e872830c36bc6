// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod dto;
pub mod error_mapping;
mod errors;
pub mod messages;
pub mod openapi;

pub use dto::{
    KpiBatchRequest, KpiMyQuery, KpiUpdateForm, LoginRequest, RegisterRequest, TeamKpiRequest,
    UpstreamReply, UpstreamRequest,
};
pub use errors::{ApiError, ApiErrorCode, ApiErrorEnvelope, API_ERROR_CODES};

pub const CRATE_NAME: &str = "rsia-kpi-api";
pub const API_CONTRACT_VERSION: &str = "v1";
