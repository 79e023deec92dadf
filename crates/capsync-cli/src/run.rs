//! The sequential reconciliation pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use capsync_core::{Decision, RunContext, RunSummary, apply_plan, load_definitions, plan, render};
use capsync_graph::{Authenticator, GraphClient};
use capsync_notify::NtfyPublisher;

use crate::RunConfig;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "capsync", version, about = "Reconcile conditional access policy definitions against Entra ID")]
pub struct Cli {
    /// Directory containing policy definition files.
    #[arg(long, value_name = "PATH")]
    pub dir: PathBuf,

    /// Plan the reconciliation and log the decisions without applying them
    /// or sending a notification.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// Execute one reconciliation run.
///
/// Load, authenticate, fetch, plan, apply, report, each step awaited to
/// completion before the next begins. Per-item failures are absorbed into
/// the summary; only configuration and authentication problems (and an
/// unlistable remote) abort the run.
///
/// # Errors
/// Returns an error, and thereby a non-zero exit, when the definitions
/// directory cannot be read, authentication fails, or the remote policy
/// list cannot be fetched. Per-item failures and notification delivery
/// failures never error.
pub async fn run(cli: &Cli, config: RunConfig) -> Result<()> {
    info!(dir = %cli.dir.display(), dry_run = cli.dry_run, "starting policy sync");

    let outcome = load_definitions(&cli.dir).context("failed to load policy definitions")?;
    info!(
        defined = outcome.defined.len(),
        failed = outcome.failures.len(),
        "loaded definitions"
    );

    let mut summary = RunSummary::new();
    summary.absorb_load_failures(&outcome.failures);

    let mut authenticator = Authenticator::new()?;
    if let Some(authority) = &config.authority_url {
        authenticator = authenticator.with_authority_url(authority);
    }
    let token = authenticator
        .acquire_token(&config.credentials)
        .await
        .context("authentication failed")?;

    let mut client = GraphClient::new(token)?;
    if let Some(graph_url) = &config.graph_url {
        client = client.with_base_url(graph_url);
    }

    let remote = client
        .list_policies()
        .await
        .context("failed to list remote policies")?;
    info!(remote = remote.len(), "fetched remote policies");

    let decisions = plan(&remote, &outcome.defined);
    info!(decisions = decisions.len(), "reconciliation planned");

    if cli.dry_run {
        for decision in &decisions {
            match decision {
                Decision::Create(definition) => {
                    info!(policy = %definition.display_name, "would create");
                }
                Decision::Update { definition, remote_id } => {
                    info!(policy = %definition.display_name, id = %remote_id, "would update");
                }
                Decision::Delete { remote_id, display_name } => {
                    info!(policy = %display_name, id = %remote_id, "would remove");
                }
            }
        }
        info!("dry run, nothing applied");
        return Ok(());
    }

    apply_plan(&client, decisions, &mut summary).await;

    let context = RunContext {
        workflow: config.workflow.clone(),
        run_id: config.run_id.clone(),
        timestamp: Utc::now(),
    };
    let notification = render(&summary, &context);

    match NtfyPublisher::new(&config.ntfy_url) {
        Ok(publisher) => {
            if let Err(err) = publisher.publish(&notification).await {
                warn!(error = %err, "failed to deliver notification");
            }
        }
        Err(err) => warn!(error = %err, "invalid notification endpoint"),
    }

    info!(
        created = summary.created(),
        updated = summary.updated(),
        removed = summary.removed(),
        failed = summary.failed(),
        "policy sync complete"
    );

    Ok(())
}
