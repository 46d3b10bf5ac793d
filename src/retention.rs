//! Version retention: keep the newest N versions of a component family,
//! delete the rest.
//!
//! "Newest" is decided by plain lexicographic string order, descending — the
//! same rule latest-version download uses. This misorders multi-digit
//! segments (`"10.0"` sorts before `"9.0"`); the quirk is deliberate and
//! pinned by a test, because changing the rule would silently change which
//! versions a retention pass deletes.

use crate::client::NexusClient;
use crate::error::{Error, Result};
use crate::types::{BatchResults, Component, SearchQuery, count_successes};

/// Result of one retention pass.
#[derive(Debug)]
pub enum RetentionReport {
    /// Versions found, but none beyond the retention window
    NothingToDelete,
    /// Per-component outcomes of the deletions that were attempted
    Deleted(BatchResults),
}

/// Order versions newest-first by lexicographic string comparison.
pub(crate) fn sort_versions_descending(versions: &mut [String]) {
    versions.sort_by(|a, b| b.cmp(a));
}

/// Order components newest-first by their version string; a missing version
/// sorts last.
pub(crate) fn sort_components_by_version_descending(components: &mut [Component]) {
    components.sort_by(|a, b| {
        b.version
            .as_deref()
            .unwrap_or("")
            .cmp(a.version.as_deref().unwrap_or(""))
    });
}

impl NexusClient {
    /// Delete every version of `group:name` beyond the `keep_latest` newest.
    ///
    /// Destructive and irreversible — there is no dry run here; callers
    /// wanting confirmation implement it above this layer. Returns
    /// [`RetentionReport::NothingToDelete`] when all found versions fit the
    /// window, otherwise the per-component outcome map of the deletions.
    /// Finding no versions at all is an error.
    pub async fn cleanup_old_versions(
        &self,
        repository: &str,
        group: &str,
        name: &str,
        keep_latest: usize,
    ) -> Result<RetentionReport> {
        let mut query = SearchQuery::in_repository(repository);
        query.group = Some(group.to_string());
        query.name = Some(name.to_string());

        let mut components = self.search_all_components(&query).await;
        if components.is_empty() {
            return Err(Error::NotFound(format!(
                "no versions of {}:{} in {}",
                group, name, repository
            )));
        }

        sort_components_by_version_descending(&mut components);
        let doomed: Vec<String> = components
            .iter()
            .skip(keep_latest)
            .map(|component| component.id.clone())
            .collect();

        if doomed.is_empty() {
            tracing::info!(
                group,
                name,
                versions = components.len(),
                keep_latest,
                "nothing beyond the retention window"
            );
            return Ok(RetentionReport::NothingToDelete);
        }

        tracing::info!(
            group,
            name,
            keep_latest,
            deleting = doomed.len(),
            "deleting versions beyond the retention window"
        );
        let results = self.batch_delete_components(doomed).await;
        tracing::info!(
            succeeded = count_successes(&results),
            total = results.len(),
            "retention pass finished"
        );
        Ok(RetentionReport::Deleted(results))
    }
}
