// SPDX-License-Identifier: Apache-2.0

use crate::messages;
use crate::{ApiError, ApiErrorEnvelope};
use rsia_kpi_model::serde_helpers::{lenient_string, value_to_text};
use rsia_kpi_model::{Credentials, KpiBatchWire, MasterIndicator, ModelError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub password: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub name: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiErrorEnvelope> {
        for (field, value) in [
            ("email", &self.email),
            ("password", &self.password),
            ("name", &self.name),
        ] {
            if value.trim().is_empty() {
                return Err(ApiErrorEnvelope::new(
                    ApiError::missing_field(field),
                    messages::REGISTER_FIELDS_REQUIRED,
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub password: String,
}

impl LoginRequest {
    pub fn credentials(&self) -> Result<Credentials, ApiErrorEnvelope> {
        Credentials::new(&self.email, &self.password)
            .map_err(|e| missing(&e, messages::LOGIN_FIELDS_REQUIRED))
    }
}

/// `POST /api/kpi-batch` body: identity plus the batch form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KpiBatchRequest {
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub password: String,
    #[serde(flatten)]
    pub batch: KpiBatchWire,
}

impl KpiBatchRequest {
    pub fn credentials(&self) -> Result<Credentials, ModelError> {
        Credentials::new(&self.email, &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KpiMyQuery {
    #[serde(default)]
    pub email: Option<String>,
}

impl KpiMyQuery {
    pub fn email(&self) -> Result<&str, ApiErrorEnvelope> {
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => Ok(email),
            _ => Err(ApiErrorEnvelope::new(
                ApiError::missing_field("email"),
                messages::KPI_MY_EMAIL_REQUIRED,
            )),
        }
    }
}

/// Text fields of the `POST /api/kpi-update` multipart form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KpiUpdateForm {
    pub kpi_key: String,
    pub actual: Option<String>,
    pub email: String,
}

impl KpiUpdateForm {
    pub fn validate(&self) -> Result<(), ApiErrorEnvelope> {
        for (field, value) in [("kpiKey", &self.kpi_key), ("email", &self.email)] {
            if value.trim().is_empty() {
                return Err(ApiErrorEnvelope::new(
                    ApiError::missing_field(field),
                    messages::KPI_UPDATE_FIELDS_REQUIRED,
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamKpiRequest {
    #[serde(default)]
    pub nama: Value,
}

impl TeamKpiRequest {
    /// The viewer's name, trimmed. Must be a non-blank JSON string.
    pub fn viewer_name(&self) -> Result<String, ApiErrorEnvelope> {
        match &self.nama {
            Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            _ => Err(ApiErrorEnvelope::new(
                ApiError::missing_field("nama"),
                messages::TEAM_VIEWER_REQUIRED,
            )),
        }
    }
}

/// Request bodies understood by the scripting service, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action")]
pub enum UpstreamRequest {
    #[serde(rename = "register")]
    Register {
        email: String,
        password: String,
        name: String,
    },
    #[serde(rename = "login")]
    Login { email: String, password: String },
    #[serde(rename = "getIndikatorData")]
    GetIndicatorData,
    #[serde(rename = "kpiBatch")]
    KpiBatch {
        email: String,
        password: String,
        #[serde(flatten)]
        batch: KpiBatchWire,
    },
    #[serde(rename = "getKpiByUser")]
    GetKpiByUser { email: String },
    #[serde(rename = "updateKPI")]
    UpdateKpi {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        actual: Option<String>,
        email: String,
        bukti: String,
    },
    #[serde(rename = "getTeamKPI")]
    GetTeamKpi { nama: String },
}

impl UpstreamRequest {
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Login { .. } => "login",
            Self::GetIndicatorData => "getIndikatorData",
            Self::KpiBatch { .. } => "kpiBatch",
            Self::GetKpiByUser { .. } => "getKpiByUser",
            Self::UpdateKpi { .. } => "updateKPI",
            Self::GetTeamKpi { .. } => "getTeamKPI",
        }
    }
}

/// `{ result, message, ...extra }` as answered by the scripting service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpstreamReply {
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub result: String,
    #[serde(default)]
    pub message: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UpstreamReply {
    #[must_use]
    pub fn success(message: Value) -> Self {
        Self {
            result: "success".to_string(),
            message,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            result: "error".to_string(),
            message: Value::String(message.to_string()),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }

    /// `message` as display text; arrays and objects become their JSON text.
    #[must_use]
    pub fn message_text(&self) -> String {
        value_to_text(&self.message)
    }

    /// Reads `message` as the master indicator table. A missing table is empty.
    pub fn master_indicators(&self) -> Result<Vec<MasterIndicator>, serde_json::Error> {
        if self.message.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(self.message.clone())
    }

    /// `edit_count` reported after an entry update, inside `message` or beside it.
    #[must_use]
    pub fn edit_count(&self) -> Option<u32> {
        let raw = self
            .message
            .get("edit_count")
            .or_else(|| self.extra.get("edit_count"))?;
        match raw {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn missing(err: &ModelError, user_message: &str) -> ApiErrorEnvelope {
    match err {
        ModelError::MissingField(field) => {
            ApiErrorEnvelope::new(ApiError::missing_field(field), user_message)
        }
        other => ApiErrorEnvelope::from(other),
    }
}
