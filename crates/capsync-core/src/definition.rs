//! Typed conditional access policy definitions.
//!
//! A definition file is JSON with a `displayName` reconciliation key, the
//! three opaque control payloads, and an activation `state`. The controls are
//! deliberately kept as raw [`Value`]s: this tool reconciles by name only and
//! passes policy content through to the service unmodified.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Activation mode of a conditional access policy.
///
/// Spellings follow the Graph API's `conditionalAccessPolicyState` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyState {
    /// Policy is enforced.
    #[serde(rename = "enabled")]
    Enabled,
    /// Policy exists but is not evaluated.
    #[serde(rename = "disabled")]
    Disabled,
    /// Policy is evaluated and logged but not enforced.
    #[serde(rename = "enabledForReportingButNotEnforced")]
    ReportOnly,
}

impl std::fmt::Display for PolicyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::ReportOnly => write!(f, "enabledForReportingButNotEnforced"),
        }
    }
}

/// A local, file-backed declaration of desired policy state.
///
/// Serialization of this struct is exactly the create/update payload shape:
/// `displayName`, `conditions`, `grantControls`, `sessionControls`, `state`
/// and nothing else. In particular no remote `id` ever appears here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDefinition {
    /// Unique reconciliation key, matched against the remote display name.
    pub display_name: String,

    /// Conditions payload, passed through unmodified.
    pub conditions: Value,

    /// Grant controls payload, passed through unmodified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_controls: Option<Value>,

    /// Session controls payload, passed through unmodified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_controls: Option<Value>,

    /// Activation mode.
    pub state: PolicyState,
}

impl PolicyDefinition {
    /// Parse a definition from raw JSON text.
    ///
    /// # Errors
    /// Returns the underlying decode error when the text is not valid JSON
    /// or does not match the definition schema (missing `displayName`,
    /// unknown `state`, wrong types).
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
