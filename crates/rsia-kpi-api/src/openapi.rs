// SPDX-License-Identifier: Apache-2.0

use crate::API_ERROR_CODES;
use serde_json::{json, Value};

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiErrorEnvelope"}}}
    })
}

fn passthrough(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/UpstreamReply"}}}
    })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {"application/json": {"schema": {"$ref": format!("#/components/schemas/{schema}")}}}
    })
}

#[must_use]
pub fn openapi_v1_spec() -> Value {
    let error_codes: Vec<&str> = API_ERROR_CODES.iter().map(|c| c.as_str()).collect();
    json!({
      "openapi": "3.0.3",
      "info": {
        "title": "rsia-kpi API",
        "version": "v1",
        "x-api-contract-version": crate::API_CONTRACT_VERSION
      },
      "paths": {
        "/api/indikator-data": {
          "get": {"responses": {
            "200": passthrough("master indicator table"),
            "502": error_response("upstream unavailable")
          }}
        },
        "/api/kpi-batch": {
          "post": {
            "requestBody": json_body("KpiBatchRequest"),
            "parameters": [
              {"name": "Idempotency-Key", "in": "header", "schema": {"type": "string"}}
            ],
            "responses": {
              "200": passthrough("batch stored upstream"),
              "400": error_response("invalid batch or failed validation"),
              "502": error_response("upstream unreachable or rejected the batch"),
              "503": error_response("master data unavailable")
            }
          }
        },
        "/api/kpi-my": {
          "get": {
            "parameters": [
              {"name": "email", "in": "query", "required": true, "schema": {"type": "string"}}
            ],
            "responses": {
              "200": passthrough("KPI rows of the user"),
              "400": error_response("email missing"),
              "502": error_response("upstream unavailable")
            }
          }
        },
        "/api/kpi-update": {
          "post": {
            "requestBody": {
              "required": true,
              "content": {"multipart/form-data": {"schema": {
                "type": "object",
                "required": ["kpiKey", "email"],
                "properties": {
                  "kpiKey": {"type": "string"},
                  "email": {"type": "string"},
                  "actual": {"type": "string"},
                  "buktiFile": {"type": "string", "format": "binary"}
                }
              }}}
            },
            "responses": {
              "200": passthrough("entry updated, carries edit_count"),
              "400": error_response("missing field or unsupported file type"),
              "502": error_response("upstream unavailable")
            }
          }
        },
        "/api/login": {
          "post": {
            "requestBody": json_body("LoginRequest"),
            "responses": {
              "200": passthrough("login result with uid, name and photo"),
              "400": error_response("missing credentials"),
              "502": error_response("upstream unavailable")
            }
          }
        },
        "/api/register": {
          "post": {
            "requestBody": json_body("RegisterRequest"),
            "responses": {
              "200": passthrough("registration result"),
              "400": error_response("missing field"),
              "502": error_response("upstream unavailable")
            }
          }
        },
        "/api/team-kpi": {
          "post": {
            "requestBody": json_body("TeamKpiRequest"),
            "responses": {
              "200": passthrough("team KPI rows"),
              "400": passthrough("viewer name missing or upstream refused"),
              "502": error_response("upstream unavailable")
            }
          }
        },
        "/healthz": {"get": {"responses": {"200": {"description": "ok"}}}},
        "/metrics": {"get": {"responses": {"200": {"description": "prometheus metrics"}}}},
        "/readyz": {"get": {"responses": {
          "200": {"description": "ready"},
          "503": {"description": "not ready"}
        }}},
        "/v1/openapi.json": {"get": {"responses": {"200": {"description": "this document"}}}},
        "/v1/version": {"get": {"responses": {"200": {"description": "service version metadata"}}}}
      },
      "components": {
        "schemas": {
          "ApiError": {
            "type": "object",
            "additionalProperties": false,
            "required": ["code", "message", "details", "request_id"],
            "properties": {
              "code": {"type": "string", "enum": error_codes},
              "message": {"type": "string"},
              "details": {"type": "object"},
              "request_id": {"type": "string"}
            }
          },
          "ApiErrorEnvelope": {
            "type": "object",
            "additionalProperties": false,
            "required": ["result", "message", "error"],
            "properties": {
              "result": {"type": "string", "enum": ["error"]},
              "message": {"type": "string"},
              "error": {"$ref": "#/components/schemas/ApiError"}
            }
          },
          "KpiBatchRequest": {
            "type": "object",
            "required": ["email", "password", "nama", "tanda_tangan", "indikator_list"],
            "properties": {
              "email": {"type": "string"},
              "password": {"type": "string"},
              "nama": {"type": "string"},
              "divisi": {"type": "string"},
              "unit": {"type": "string"},
              "tanda_tangan": {"type": "string", "description": "data URI of the signature image"},
              "indikator_list": {"type": "array", "minItems": 1, "items": {"$ref": "#/components/schemas/KpiEntry"}}
            }
          },
          "KpiEntry": {
            "type": "object",
            "required": ["indikator_kpi", "target", "bukti_nilai"],
            "properties": {
              "indikator_kpi": {"type": "string"},
              "area_kinerja": {"type": "string"},
              "target": {},
              "actual": {},
              "satuan": {"type": "string"},
              "bukti_nilai": {"type": "string", "description": "data URI of a JPEG, PNG or PDF file"},
              "bukti_nilai_name": {"type": "string"},
              "bukti_pdf": {"type": "boolean"}
            }
          },
          "LoginRequest": {
            "type": "object",
            "required": ["email", "password"],
            "properties": {"email": {"type": "string"}, "password": {"type": "string"}}
          },
          "RegisterRequest": {
            "type": "object",
            "required": ["email", "password", "name"],
            "properties": {
              "email": {"type": "string"},
              "password": {"type": "string"},
              "name": {"type": "string"}
            }
          },
          "TeamKpiRequest": {
            "type": "object",
            "required": ["nama"],
            "properties": {"nama": {"type": "string"}}
          },
          "UpstreamReply": {
            "type": "object",
            "required": ["result"],
            "properties": {
              "result": {"type": "string", "enum": ["success", "error"]},
              "message": {}
            }
          }
        }
      }
    })
}
