//! Reconciliation planner.
//!
//! Pure set comparison between the fetched remote policy list and the local
//! definitions. Deletions are planned first; creates and updates follow, and
//! every lookup uses the originally fetched list, never a re-fetch.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{MANAGED_PREFIX, PolicyDefinition};

/// A policy object as it exists in the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePolicy {
    /// Opaque identifier assigned by the service.
    pub id: String,
    /// Display name, matched against [`PolicyDefinition::display_name`].
    pub display_name: String,
}

impl RemotePolicy {
    /// Whether this policy carries the managed namespace prefix and is
    /// therefore eligible for deletion.
    #[must_use]
    pub fn is_managed(&self) -> bool {
        self.display_name.starts_with(MANAGED_PREFIX)
    }
}

/// One reconciliation decision.
///
/// Exactly one decision is produced per distinct name in the union of
/// managed remote names and defined names.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The name is defined locally but absent remotely.
    Create(PolicyDefinition),
    /// The name exists on both sides; the remote object is overwritten.
    Update {
        /// Desired state.
        definition: PolicyDefinition,
        /// Identifier of the remote object to patch.
        remote_id: String,
    },
    /// A managed remote policy has no local definition.
    Delete {
        /// Identifier of the remote object to remove.
        remote_id: String,
        /// Display name, kept for reporting.
        display_name: String,
    },
}

impl Decision {
    /// Display name the decision applies to.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Create(definition) => &definition.display_name,
            Self::Update { definition, .. } => &definition.display_name,
            Self::Delete { display_name, .. } => display_name,
        }
    }
}

/// Compute the ordered reconciliation plan.
///
/// Two passes over immutable inputs:
/// 1. every *managed* remote policy without a local definition becomes a
///    [`Decision::Delete`]; unprefixed remote policies are never touched;
/// 2. every local definition becomes a [`Decision::Update`] when a remote
///    policy with the exact same name exists (managed or not), otherwise a
///    [`Decision::Create`].
///
/// Name matching is exact, case-sensitive string equality.
#[must_use]
pub fn plan(
    remote: &[RemotePolicy],
    defined: &BTreeMap<String, PolicyDefinition>,
) -> Vec<Decision> {
    let mut decisions = Vec::new();

    for policy in remote {
        if policy.is_managed() && !defined.contains_key(&policy.display_name) {
            decisions.push(Decision::Delete {
                remote_id: policy.id.clone(),
                display_name: policy.display_name.clone(),
            });
        }
    }

    for (name, definition) in defined {
        let existing = remote.iter().find(|policy| policy.display_name == *name);
        match existing {
            Some(policy) => decisions.push(Decision::Update {
                definition: definition.clone(),
                remote_id: policy.id.clone(),
            }),
            None => decisions.push(Decision::Create(definition.clone())),
        }
    }

    decisions
}
