//! Download resolution: direct asset fetches and search-based resolution.
//!
//! Two paths exist. A direct lookup reads the asset's recorded download URL.
//! A search-based resolution asks `/search/assets/download`, which answers
//! with a bodyless 302; the resolver then issues a second, separately
//! authenticated GET against the redirect target.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::NexusClient;
use super::exec::{ApiRequest, ExecOutcome, encode_query};
use super::upload::basename;
use crate::error::{Error, Result};
use crate::retention::sort_versions_descending;
use crate::types::{Asset, ConventionFilter, SearchQuery};

impl NexusClient {
    /// Download one asset to `dest`, or to its own basename in the current
    /// directory when no destination is given.
    pub async fn download_asset(&self, asset_id: &str, dest: Option<&Path>) -> Result<PathBuf> {
        let asset = self.get_asset(asset_id).await?;
        let dest = match dest {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(fallback_filename(&asset, asset_id)),
        };
        self.download_resolved_asset(&asset, dest).await
    }

    /// Download one asset into a directory, named after its repository path.
    pub async fn download_asset_into(&self, asset_id: &str, dir: &Path) -> Result<PathBuf> {
        let asset = self.get_asset(asset_id).await?;
        let dest = dir.join(fallback_filename(&asset, asset_id));
        self.download_resolved_asset(&asset, dest).await
    }

    async fn download_resolved_asset(&self, asset: &Asset, dest: PathBuf) -> Result<PathBuf> {
        let url = asset.download_url.as_deref().ok_or_else(|| {
            Error::NotFound(format!("asset {} has no recorded download URL", asset.id))
        })?;
        self.fetch_to_file(url, &dest, None).await?;
        tracing::info!(asset_id = %asset.id, dest = %dest.display(), "asset downloaded");
        Ok(dest)
    }

    /// Resolve a search to one asset and download it.
    ///
    /// The search endpoint must answer with a redirect; any other success
    /// shape is a protocol failure. When no destination is given the filename
    /// comes from the redirect target's path.
    pub async fn search_and_download(
        &self,
        query: &SearchQuery,
        dest: Option<&Path>,
    ) -> Result<PathBuf> {
        let path = format!(
            "/search/assets/download?{}",
            encode_query(&query.query_pairs())
        );
        let outcome = self
            .execute(ApiRequest::get(&path).expect_json(false))
            .await?;
        let location = match outcome {
            ExecOutcome::Redirect(location) => location,
            _ => {
                return Err(Error::UnexpectedResponse {
                    path,
                    reason: "expected a redirect to the asset location".to_string(),
                });
            }
        };

        let dest = match dest {
            Some(path) => path.to_path_buf(),
            None => filename_from_url(&location),
        };
        self.fetch_to_file(&location, &dest, None).await?;
        tracing::info!(url = %location, dest = %dest.display(), "asset downloaded");
        Ok(dest)
    }

    /// Download the newest version of a coordinate-addressed component.
    ///
    /// Candidate versions are ordered by plain lexicographic string order
    /// (not semantic-version order), descending, and the first is taken.
    pub async fn download_latest_version(
        &self,
        repository: &str,
        group: &str,
        name: &str,
        extension: &str,
        classifier: Option<&str>,
        dest: Option<&Path>,
    ) -> Result<PathBuf> {
        let mut query = SearchQuery::in_repository(repository);
        query.group = Some(group.to_string());
        query.name = Some(name.to_string());

        let candidates = self.search_all_components(&query).await;
        let mut versions: Vec<String> = candidates
            .into_iter()
            .filter_map(|component| component.version)
            .collect();
        if versions.is_empty() {
            return Err(Error::NotFound(format!(
                "no versions of {}:{} in {}",
                group, name, repository
            )));
        }
        sort_versions_descending(&mut versions);
        let latest = versions.remove(0);
        tracing::debug!(group, name, version = %latest, "resolved latest version");

        let mut download = SearchQuery::in_repository(repository);
        download.group = Some(group.to_string());
        download.name = Some(name.to_string());
        download.version = Some(latest);
        download.convention = Some(ConventionFilter::Coordinate {
            extension: Some(extension.to_string()),
            classifier: Some(classifier.unwrap_or_default().to_string()),
        });
        self.search_and_download(&download, dest).await
    }

    /// Authenticated streaming GET of an absolute URL into a local file.
    pub(crate) async fn fetch_to_file(
        &self,
        url: &str,
        dest: &Path,
        account: Option<&str>,
    ) -> Result<()> {
        let account = self.account(account)?;
        tracing::debug!(url, dest = %dest.display(), "downloading");

        let response = self
            .http
            .get(url)
            .basic_auth(&account.username, Some(&account.password))
            .timeout(self.config.http.request_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), url, "download failed");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

fn fallback_filename(asset: &Asset, asset_id: &str) -> String {
    let name = basename(Path::new(&asset.path));
    if name.is_empty() {
        format!("asset_{}", asset_id)
    } else {
        name
    }
}

/// Filename derived from a URL's last path segment, `download` as last resort.
fn filename_from_url(location: &str) -> PathBuf {
    if let Ok(url) = url::Url::parse(location)
        && let Some(mut segments) = url.path_segments()
        && let Some(last) = segments.next_back()
        && !last.is_empty()
    {
        return PathBuf::from(last.to_string());
    }
    PathBuf::from("download")
}
