// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! RSIA KPI model SSOT.
//!
//! Wire names follow the scripting service's spreadsheet columns
//! (`nama`, `indikator_kpi`, `bukti_nilai`, ...); Rust names follow their meaning.

mod batch;
mod cell;
mod entry;
mod error;
mod evidence;
mod indicator;
pub mod serde_helpers;
mod session;

pub use batch::{KpiBatch, KpiBatchWire};
pub use cell::CellValue;
pub use entry::{KpiEntry, KpiEntryWire};
pub use error::ModelError;
pub use evidence::{
    is_accepted_evidence_type, EncodedEvidence, Signature, ACCEPTED_EVIDENCE_TYPES, MIME_JPEG,
    MIME_PDF, MIME_PNG,
};
pub use indicator::{
    employee_names, indicators_for, is_fluctuating_target, MasterIndicator,
    FLUCTUATING_TARGET_MARKER,
};
pub use session::{Credentials, EditCounter, Session, MAX_EDITS_PER_ENTRY};

pub const CRATE_NAME: &str = "rsia-kpi-model";
