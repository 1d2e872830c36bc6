// SPDX-License-Identifier: Apache-2.0

use crate::evidence_files::{load_evidence, load_signature, read_raw};
use crate::output::emit_ok;
use crate::{CliError, Commands, Context, EntryArg};
use rsia_kpi_client::{BatchBuilder, ClientError, KpiClient};
use rsia_kpi_core::encode;
use rsia_kpi_model::{indicators_for, MasterIndicator};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;

pub(crate) async fn dispatch(command: Commands, ctx: &Context) -> Result<(), CliError> {
    match command {
        Commands::Register {
            email,
            password,
            name,
        } => register(ctx, &email, &password, &name).await,
        Commands::Login { email, password } => login(ctx, &email, &password).await,
        Commands::Logout => logout(ctx),
        Commands::Indicators { employee } => indicators(ctx, employee.as_deref()).await,
        Commands::Submit {
            employee,
            entries,
            signature,
        } => submit(ctx, &employee, &entries, &signature).await,
        Commands::MyKpi => my_kpi(ctx).await,
        Commands::Update {
            key,
            actual,
            evidence,
        } => update(ctx, &key, actual.as_deref(), evidence).await,
        Commands::TeamKpi => team_kpi(ctx).await,
    }
}

fn client(ctx: &Context) -> Result<KpiClient, CliError> {
    Ok(KpiClient::new(&ctx.api_url)?)
}

/// Client carrying the stored session; commands needing one fail before any request.
fn logged_in_client(ctx: &Context) -> Result<KpiClient, CliError> {
    let session = ctx.store.load()?.ok_or(ClientError::NotLoggedIn)?;
    Ok(client(ctx)?.with_session(Some(session)))
}

async fn register(
    ctx: &Context,
    email: &str,
    password: &str,
    name: &str,
) -> Result<(), CliError> {
    let reply = client(ctx)?.register(email, password, name).await?;
    emit_ok(
        ctx.output,
        &json!({"command": "register", "status": "ok", "message": reply.message_text()}),
    )
}

async fn login(ctx: &Context, email: &str, password: &str) -> Result<(), CliError> {
    let mut client = client(ctx)?;
    let session = client.login(email, password).await?;
    ctx.store.save(session)?;
    info!(path = %ctx.store.path().display(), "session stored");
    emit_ok(
        ctx.output,
        &json!({
            "command": "login",
            "status": "ok",
            "email": session.email,
            "name": session.name,
        }),
    )
}

fn logout(ctx: &Context) -> Result<(), CliError> {
    let existed = ctx.store.clear()?;
    emit_ok(
        ctx.output,
        &json!({
            "command": "logout",
            "status": if existed { "ok" } else { "no-session" },
        }),
    )
}

async fn indicators(ctx: &Context, employee: Option<&str>) -> Result<(), CliError> {
    let master = client(ctx)?.indicators().await?;
    let rows: Vec<Value> = match employee {
        Some(name) => {
            let assigned = indicators_for(&master, name);
            if assigned.is_empty() {
                return Err(ClientError::UnknownEmployee(name.to_string()).into());
            }
            assigned.into_iter().map(row_json).collect()
        }
        None => master.iter().map(row_json).collect(),
    };
    emit_ok(
        ctx.output,
        &json!({"command": "indicators", "count": rows.len(), "rows": rows}),
    )
}

fn row_json(row: &MasterIndicator) -> Value {
    json!({
        "nama": row.name,
        "divisi": row.division,
        "unit": row.unit,
        "area_kinerja": row.performance_area,
        "indikator_kpi": row.indicator_name,
        "target": row.target,
        "satuan": row.unit_of_measure,
        "fluktuatif": row.is_target_fluctuating(),
    })
}

async fn submit(
    ctx: &Context,
    employee: &str,
    entries: &[EntryArg],
    signature: &Path,
) -> Result<(), CliError> {
    let client = logged_in_client(ctx)?;
    // Local files are checked before the master table is fetched.
    let mut evidence = Vec::with_capacity(entries.len());
    for entry in entries {
        evidence.push(load_evidence(&entry.evidence)?);
    }
    let signature = load_signature(signature)?;

    let master = client.indicators().await?;
    let mut builder = BatchBuilder::for_employee(&master, employee)?;
    for (entry, evidence) in entries.iter().zip(evidence) {
        match &entry.target {
            Some(target) => {
                builder.add_with_target(&entry.indicator, target, &entry.actual, evidence)?
            }
            None => builder.add(&entry.indicator, &entry.actual, evidence)?,
        };
    }
    builder.sign(&signature)?;
    let batch = builder.build()?;
    let reply = client.submit(&batch).await?;
    emit_ok(
        ctx.output,
        &json!({
            "command": "submit",
            "status": "ok",
            "employee": batch.employee_name(),
            "entries": batch.len(),
            "message": reply.message_text(),
        }),
    )
}

async fn my_kpi(ctx: &Context) -> Result<(), CliError> {
    let mut client = logged_in_client(ctx)?;
    let rows = client.my_kpi().await?;
    emit_ok(ctx.output, &json!({"command": "my-kpi", "rows": rows}))
}

async fn update(
    ctx: &Context,
    kpi_key: &str,
    actual: Option<&str>,
    evidence: Option<PathBuf>,
) -> Result<(), CliError> {
    if actual.is_none() && evidence.is_none() {
        return Err(CliError::usage("update needs --actual or --evidence"));
    }
    let file = match evidence {
        Some(path) => {
            let raw = read_raw(&path)?;
            encode(&raw).map_err(ClientError::from)?;
            Some(raw)
        }
        None => None,
    };
    let mut client = logged_in_client(ctx)?;
    // Seeds the edit counters so the cap holds across invocations.
    client.my_kpi().await?;
    let reply = client.update_kpi(kpi_key, actual, file).await?;
    emit_ok(
        ctx.output,
        &json!({
            "command": "update",
            "status": "ok",
            "kpi_key": kpi_key,
            "edit_count": client.edits().count(kpi_key),
            "message": reply.message_text(),
        }),
    )
}

async fn team_kpi(ctx: &Context) -> Result<(), CliError> {
    let data = logged_in_client(ctx)?.team_kpi().await?;
    emit_ok(ctx.output, &json!({"command": "team-kpi", "data": data}))
}
