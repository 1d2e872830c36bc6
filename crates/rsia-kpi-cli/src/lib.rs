// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod command_actions;
mod evidence_files;
mod output;

use clap::{error::ErrorKind, ArgAction, Parser, Subcommand};
use rsia_kpi_client::{ClientError, SessionStore, DEFAULT_BASE_URL, ENV_RSIA_API_BASE_URL};
use rsia_kpi_core::ExitCode;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing_subscriber::EnvFilter;

pub use evidence_files::EntryArg;

pub const CRATE_NAME: &str = "rsia-kpi-cli";
pub const ENV_RSIA_LOG: &str = "RSIA_LOG";
pub const ENV_RSIA_PASSWORD: &str = "RSIA_PASSWORD";

const RSIA_HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
Usage: {usage}

Options:
{options}

Commands:
{subcommands}
{after-help}";

#[derive(Parser)]
#[command(name = "rsia-kpi", version)]
#[command(about = "RSIA KPI submission CLI")]
#[command(help_template = RSIA_HELP_TEMPLATE)]
#[command(
    after_help = "Environment:\n  RSIA_API_BASE_URL   Proxy base URL\n  RSIA_SESSION_FILE   Session file location\n  RSIA_PASSWORD       Password for register/login\n  RSIA_LOG            Log filter override"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[arg(long, global = true, env = ENV_RSIA_API_BASE_URL, default_value = DEFAULT_BASE_URL)]
    api_url: String,
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an employee account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = ENV_RSIA_PASSWORD, hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Log in and keep the session for later commands.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = ENV_RSIA_PASSWORD, hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// List master indicators, optionally for one employee.
    Indicators {
        #[arg(long)]
        employee: Option<String>,
    },
    /// Submit one employee's KPI batch.
    Submit {
        #[arg(long)]
        employee: String,
        /// INDICATOR|ACTUAL|EVIDENCE_FILE[|TARGET]; TARGET only for fluctuating targets.
        #[arg(long = "entry", required = true, value_parser = EntryArg::parse)]
        entries: Vec<EntryArg>,
        /// Signature image (PNG/JPG) or stroke file (.json).
        #[arg(long)]
        signature: PathBuf,
    },
    /// Show your own KPI rows.
    MyKpi,
    /// Revise the actual value or evidence of a submitted row.
    Update {
        #[arg(long)]
        key: String,
        #[arg(long)]
        actual: Option<String>,
        #[arg(long)]
        evidence: Option<PathBuf>,
    },
    /// Show the KPI rows of the team you supervise.
    TeamKpi,
}

#[derive(Clone, Copy)]
struct LogFlags {
    quiet: bool,
    verbose: u8,
}

#[derive(Clone, Copy)]
pub(crate) struct OutputMode {
    json: bool,
}

pub(crate) struct Context {
    api_url: String,
    store: SessionStore,
    output: OutputMode,
}

/// Machine-readable error printed on stderr under `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct MachineError {
    code: String,
    message: String,
    details: BTreeMap<String, String>,
}

impl MachineError {
    fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: BTreeMap::new(),
        }
    }

    fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug)]
pub(crate) struct CliError {
    exit_code: ExitCode,
    machine: MachineError,
}

impl CliError {
    pub(crate) fn usage(message: &str) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("usage_error", message),
        }
    }

    pub(crate) fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::new("internal_error", &message),
        }
    }

    pub(crate) fn input(message: String) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("input_error", &message),
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        let code = match &err {
            ClientError::NotLoggedIn => "not_logged_in",
            ClientError::Transport { .. } => "transport_error",
            ClientError::Api { .. } => "api_error",
            ClientError::Rejected { .. } => "rejected",
            ClientError::InvalidReply { .. } => "invalid_reply",
            ClientError::SessionFile { .. } => "session_file_error",
            _ => "validation_error",
        };
        let mut machine =
            MachineError::new(code, &err.user_message()).with_detail("error", &err.to_string());
        if let ClientError::Api { envelope, .. } = &err {
            machine = machine
                .with_detail("api_code", envelope.error.code.as_str())
                .with_detail("request_id", &envelope.error.request_id);
        }
        Self {
            exit_code: err.exit_code(),
            machine,
        }
    }
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError {
                    exit_code: ExitCode::Usage,
                    machine: MachineError::new("usage_error", "invalid command line arguments")
                        .with_detail("error", &err.to_string()),
                });
            }
        },
    };
    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help"))?;
    init_logging(LogFlags {
        quiet: cli.quiet,
        verbose: cli.verbose,
    });
    let ctx = Context {
        api_url: cli.api_url,
        store: cli
            .session_file
            .map_or_else(SessionStore::at_default_location, SessionStore::new),
        output: OutputMode { json: cli.json },
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("async runtime: {e}")))?;
    runtime.block_on(command_actions::dispatch(command, &ctx))
}

fn init_logging(flags: LogFlags) {
    let default_level = if flags.quiet {
        "error"
    } else {
        match flags.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_env(ENV_RSIA_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine.message);
    }
}
