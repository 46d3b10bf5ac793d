//! Bounded-concurrency batch execution with per-unit failure isolation.
//!
//! Many repository operations are "do the same thing to N independent ids" —
//! download these assets, delete those components. [`run_batch`] fans the
//! units out over a bounded pool and collects exactly one outcome per input
//! key, no matter how a unit ends: normal result, error, panic, or timeout.
//! Units return values; only the orchestrator's own collection point writes
//! the result map, so there is no shared mutable state between units.

use futures::{StreamExt, stream};
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use crate::client::NexusClient;
use crate::types::{BatchOutcome, BatchResults};

/// Run independent units over a bounded worker pool.
///
/// `items` pairs each input key with the unit's payload; `op` turns a payload
/// into a future producing that unit's [`BatchOutcome`]. At most
/// `concurrency` units are in flight at once. Each unit runs in its own task:
/// a panic is caught at the join boundary and a unit that outlives
/// `unit_timeout` is abandoned — both are recorded as `Failed`, never
/// propagated to the other units or to the caller's control flow. Completion
/// order is whichever unit finishes first; the result map carries exactly one
/// entry per input key.
///
/// Once dispatched, a unit cannot be aborted mid-flight; the timeout only
/// stops the orchestrator from waiting on it.
pub async fn run_batch<T, F, Fut>(
    items: Vec<(String, T)>,
    concurrency: usize,
    unit_timeout: Duration,
    op: F,
) -> BatchResults
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = BatchOutcome> + Send + 'static,
{
    stream::iter(items.into_iter().map(|(key, item)| {
        let unit = op(item);
        async move {
            let outcome = match tokio::spawn(tokio::time::timeout(unit_timeout, unit)).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => {
                    BatchOutcome::Failed(format!("unit timed out after {:?}", unit_timeout))
                }
                Err(e) => BatchOutcome::Failed(format!("unit panicked: {}", e)),
            };
            (key, outcome)
        }
    }))
    .buffer_unordered(concurrency.max(1))
    .collect::<HashMap<_, _>>()
    .await
}

fn keyed(ids: Vec<String>) -> Vec<(String, String)> {
    ids.into_iter().map(|id| (id.clone(), id)).collect()
}

impl NexusClient {
    /// Download many assets into one directory, concurrently.
    ///
    /// Per-asset outcome map: `Saved(path)` on success, `Failed` otherwise.
    /// One asset's failure never affects the others.
    pub async fn batch_download_assets(
        &self,
        asset_ids: Vec<String>,
        download_dir: &Path,
    ) -> BatchResults {
        if let Err(e) = tokio::fs::create_dir_all(download_dir).await {
            tracing::error!(
                dir = %download_dir.display(),
                error = %e,
                "could not create download directory"
            );
            let reason = format!("could not create download directory: {}", e);
            return asset_ids
                .into_iter()
                .map(|id| (id, BatchOutcome::Failed(reason.clone())))
                .collect();
        }

        let client = self.clone();
        let dir = download_dir.to_path_buf();
        run_batch(
            keyed(asset_ids),
            self.config.batch.download_workers,
            self.config.batch.unit_timeout,
            move |asset_id: String| {
                let client = client.clone();
                let dir = dir.clone();
                async move {
                    match client.download_asset_into(&asset_id, &dir).await {
                        Ok(path) => {
                            tracing::info!(asset_id = %asset_id, "batch download succeeded");
                            BatchOutcome::Saved(path)
                        }
                        Err(e) => {
                            tracing::error!(asset_id = %asset_id, error = %e, "batch download failed");
                            BatchOutcome::Failed(e.to_string())
                        }
                    }
                }
            },
        )
        .await
    }

    /// Delete many components, concurrently.
    pub async fn batch_delete_components(&self, component_ids: Vec<String>) -> BatchResults {
        let client = self.clone();
        run_batch(
            keyed(component_ids),
            self.config.batch.delete_workers,
            self.config.batch.unit_timeout,
            move |component_id: String| {
                let client = client.clone();
                async move {
                    match client.delete_component(&component_id).await {
                        Ok(()) => {
                            tracing::info!(component_id = %component_id, "component deleted");
                            BatchOutcome::Done
                        }
                        Err(e) => {
                            tracing::error!(
                                component_id = %component_id,
                                error = %e,
                                "component deletion failed"
                            );
                            BatchOutcome::Failed(e.to_string())
                        }
                    }
                }
            },
        )
        .await
    }
}
