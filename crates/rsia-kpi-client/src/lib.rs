// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Client side of the KPI proxy.
//!
//! Identity lives in an explicit [`Session`] created by [`KpiClient::login`]
//! and dropped by [`KpiClient::logout`]; nothing is read from ambient state.

mod batch_builder;
mod client;
mod error;
mod session_store;

pub use batch_builder::BatchBuilder;
pub use client::{KpiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, ENV_RSIA_API_BASE_URL};
pub use error::ClientError;
pub use rsia_kpi_model::{EditCounter, Session};
pub use session_store::SessionStore;

pub const CRATE_NAME: &str = "rsia-kpi-client";
