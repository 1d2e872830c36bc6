// SPDX-License-Identifier: Apache-2.0

//! User-facing texts shown by the KPI front end.

pub const REGISTER_FIELDS_REQUIRED: &str = "Email, password, dan nama wajib diisi!";
pub const REGISTER_FAILED: &str = "Terjadi kesalahan saat registrasi.";
pub const LOGIN_FAILED: &str = "Terjadi kesalahan saat login.";
pub const LOGIN_FIELDS_REQUIRED: &str = "Email dan password wajib diisi!";
pub const MASTER_DATA_FAILED: &str = "Gagal validasi indikator (master data).";
pub const KPI_SUBMIT_FAILED: &str = "Gagal mengirim KPI.";
pub const INDICATORS_FAILED: &str = "Gagal mengambil indikator!";
pub const KPI_MY_EMAIL_REQUIRED: &str = "Email wajib dikirim";
pub const KPI_MY_FAILED: &str = "Gagal mengambil KPI user";
pub const KPI_UPDATE_FIELDS_REQUIRED: &str = "ID KPI dan email wajib dikirim!";
pub const KPI_UPDATE_FAILED: &str = "Gagal update KPI";
pub const TEAM_VIEWER_REQUIRED: &str = "Nama viewer wajib dikirim";
pub const TEAM_KPI_FAILED: &str = "Gagal mengambil KPI team";
pub const TEAM_KPI_SERVER_FAILED: &str = "Server gagal memproses KPI team";
pub const INVALID_BODY: &str = "Data yang dikirim tidak valid.";
pub const INTERNAL: &str = "Terjadi kesalahan pada server.";
