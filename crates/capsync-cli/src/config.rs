//! Environment-supplied run configuration.
//!
//! Everything the CI trigger provides arrives as environment variables.
//! All of them are required with no defaults; the two base-URL overrides
//! exist for tests and are optional.

use anyhow::{Context, Result, bail};
use capsync_graph::ClientCredentials;

/// Application (client) id.
pub const ENV_CLIENT_ID: &str = "CAPSYNC_CLIENT_ID";
/// Client secret.
pub const ENV_CLIENT_SECRET: &str = "CAPSYNC_CLIENT_SECRET";
/// Tenant (directory) id.
pub const ENV_TENANT_ID: &str = "CAPSYNC_TENANT_ID";
/// Notification topic endpoint.
pub const ENV_NTFY_URL: &str = "CAPSYNC_NTFY_URL";
/// Workflow name label for the report header.
pub const ENV_WORKFLOW: &str = "CAPSYNC_WORKFLOW";
/// Run identifier label for the report header.
pub const ENV_RUN_ID: &str = "CAPSYNC_RUN_ID";
/// Optional token authority override.
pub const ENV_AUTHORITY_URL: &str = "CAPSYNC_AUTHORITY_URL";
/// Optional Graph base URL override.
pub const ENV_GRAPH_URL: &str = "CAPSYNC_GRAPH_URL";

/// Resolved run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Credentials for the client-credentials exchange.
    pub credentials: ClientCredentials,
    /// Notification endpoint URL.
    pub ntfy_url: String,
    /// Workflow name label.
    pub workflow: String,
    /// Run identifier label.
    pub run_id: String,
    /// Token authority override, tests only.
    pub authority_url: Option<String>,
    /// Graph base URL override, tests only.
    pub graph_url: Option<String>,
}

impl RunConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Fails on the first missing or empty required variable, naming it.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            credentials: ClientCredentials {
                client_id: required(ENV_CLIENT_ID)?,
                client_secret: required(ENV_CLIENT_SECRET)?,
                tenant_id: required(ENV_TENANT_ID)?,
            },
            ntfy_url: required(ENV_NTFY_URL)?,
            workflow: required(ENV_WORKFLOW)?,
            run_id: required(ENV_RUN_ID)?,
            authority_url: optional(ENV_AUTHORITY_URL),
            graph_url: optional(ENV_GRAPH_URL),
        })
    }
}

fn required(name: &str) -> Result<String> {
    let value = std::env::var(name)
        .with_context(|| format!("missing required environment variable {name}"))?;
    if value.trim().is_empty() {
        bail!("environment variable {name} is empty");
    }
    Ok(value)
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
