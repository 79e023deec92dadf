//! Plan application over the [`PolicyStore`] seam.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{Decision, Operation, PolicyDefinition, RunSummary, StoreError};

/// Remote policy store the applier drives.
///
/// Implemented by the Graph client; tests substitute an in-memory double.
#[async_trait]
pub trait PolicyStore {
    /// Create a policy from a definition.
    async fn create(&self, definition: &PolicyDefinition) -> Result<(), StoreError>;

    /// Overwrite the policy with the given id from a definition.
    async fn update(&self, id: &str, definition: &PolicyDefinition) -> Result<(), StoreError>;

    /// Delete the policy with the given id.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Execute each decision in order, recording every outcome in the summary.
///
/// Operations are issued strictly sequentially; a failure is recorded and
/// execution continues with the next decision. Nothing is retried and
/// nothing is rolled back.
pub async fn apply_plan<S>(store: &S, decisions: Vec<Decision>, summary: &mut RunSummary)
where
    S: PolicyStore + Sync,
{
    for decision in decisions {
        match decision {
            Decision::Create(definition) => {
                let name = definition.display_name.clone();
                match store.create(&definition).await {
                    Ok(()) => {
                        info!(policy = %name, "created policy");
                        summary.record_created(&name);
                    }
                    Err(err) => {
                        warn!(policy = %name, error = %err, "failed to create policy");
                        summary.record_failed(Operation::Create, &name, &err.to_string());
                    }
                }
            }
            Decision::Update {
                definition,
                remote_id,
            } => {
                let name = definition.display_name.clone();
                match store.update(&remote_id, &definition).await {
                    Ok(()) => {
                        info!(policy = %name, id = %remote_id, "updated policy");
                        summary.record_updated(&name);
                    }
                    Err(err) => {
                        warn!(policy = %name, id = %remote_id, error = %err, "failed to update policy");
                        summary.record_failed(Operation::Update, &name, &err.to_string());
                    }
                }
            }
            Decision::Delete {
                remote_id,
                display_name,
            } => match store.delete(&remote_id).await {
                Ok(()) => {
                    info!(policy = %display_name, id = %remote_id, "removed policy");
                    summary.record_removed(&display_name);
                }
                Err(err) => {
                    warn!(policy = %display_name, id = %remote_id, error = %err, "failed to remove policy");
                    summary.record_failed(Operation::Remove, &display_name, &err.to_string());
                }
            },
        }
    }
}
