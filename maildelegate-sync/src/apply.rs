//! Issuing create/replace requests for resolved delegations.

use maildelegate_core::{ResolvedDelegation, TaskId};
use maildelegate_directory::{DirectoryClient, Transport};

use crate::error::SyncError;

/// Per-record result of an apply request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The server accepted the request and queued a task.
    Applied { task_id: TaskId },
    /// The server answered, but not with a usable task id.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub delegation: ResolvedDelegation,
    pub outcome: ApplyOutcome,
}

impl ApplyResult {
    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, ApplyOutcome::Applied { .. })
    }
}

/// Send one create request per entry, in order.
///
/// `on_result` sees each outcome as soon as its request is answered.
/// A bad response body is recorded and the batch continues. A connectivity
/// failure aborts the rest of the batch with [`SyncError::ApplyAborted`];
/// results already passed to `on_result` stand.
pub fn apply<T: Transport>(
    client: &DirectoryClient<T>,
    resolved: &[ResolvedDelegation],
    mut on_result: impl FnMut(&ApplyResult),
) -> Result<Vec<ApplyResult>, SyncError> {
    let mut results: Vec<ApplyResult> = Vec::with_capacity(resolved.len());

    for delegation in resolved {
        tracing::info!(record = %delegation, rights = ?delegation.intent.rights.to_list(), "processing record");
        let outcome = match client.create_delegation(
            &delegation.resource_id,
            &delegation.actor_id,
            &delegation.intent.rights,
        ) {
            Ok(task_id) => {
                tracing::info!(record = %delegation, %task_id, "delegation applied");
                ApplyOutcome::Applied { task_id }
            }
            Err(err) if err.is_connectivity() => {
                return Err(SyncError::ApplyAborted {
                    applied: results.iter().filter(|r| r.is_applied()).count(),
                    total: resolved.len(),
                    source: err,
                });
            }
            Err(err) => {
                tracing::warn!(record = %delegation, error = %err, "delegation not applied");
                ApplyOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };
        let result = ApplyResult {
            delegation: delegation.clone(),
            outcome,
        };
        on_result(&result);
        results.push(result);
    }

    Ok(results)
}
