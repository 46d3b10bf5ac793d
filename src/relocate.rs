//! Cross-repository relocation: download, reclassify, re-upload, retire.
//!
//! There is no server-side move, so relocation is a compound workflow built
//! from the primitives: every asset is downloaded into a scratch directory,
//! classified back into an upload spec matching the component's convention,
//! re-uploaded to the target repository, and only then is the source
//! component deleted. The scratch directory is removed on every exit path.

use std::path::{Path, PathBuf};

use crate::client::NexusClient;
use crate::error::{Error, Result};
use crate::types::{CoordinateUpload, PathUpload, RawFile, UploadSpec};

/// How a relocation ended.
///
/// Both variants mean the component now exists in the target repository; they
/// differ in whether the source copy is gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelocationOutcome {
    /// Uploaded to the target and removed from the source
    FullyRelocated,
    /// Uploaded to the target, but the source deletion failed — a duplicate
    /// now exists in both repositories
    SourceNotRemoved,
}

/// One asset fetched into the scratch directory, tagged with its original
/// repository path for classification.
struct DownloadedAsset {
    local: PathBuf,
    remote_path: String,
}

/// Coordinate-convention classification of downloaded files.
#[derive(Debug, Default, PartialEq, Eq)]
struct CoordinateFileSet {
    primary: Option<PathBuf>,
    pom: Option<PathBuf>,
    sources: Option<PathBuf>,
    javadoc: Option<PathBuf>,
}

/// Classify files by their original repository paths.
///
/// `.pom` suffix wins first, then a "sources" or "javadoc" substring, and
/// anything else is the primary artifact. Later files of the same kind
/// overwrite earlier ones.
fn classify_coordinate_files(files: &[(PathBuf, String)]) -> CoordinateFileSet {
    let mut set = CoordinateFileSet::default();
    for (local, remote_path) in files {
        if remote_path.ends_with(".pom") {
            set.pom = Some(local.clone());
        } else if remote_path.contains("sources") {
            set.sources = Some(local.clone());
        } else if remote_path.contains("javadoc") {
            set.javadoc = Some(local.clone());
        } else {
            set.primary = Some(local.clone());
        }
    }
    set
}

fn remote_basename(remote_path: &str) -> Option<String> {
    Path::new(remote_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

impl NexusClient {
    /// Move one component from `source_repository` to `target_repository`.
    ///
    /// An asset that fails to download is logged and omitted from the
    /// re-upload rather than aborting the relocation; the upload itself
    /// failing aborts with an error and leaves the source untouched. When the
    /// upload succeeds but the source deletion fails, the workflow still
    /// reports success — as [`RelocationOutcome::SourceNotRemoved`], so the
    /// duplicate is visible to the caller.
    pub async fn relocate_component(
        &self,
        source_repository: &str,
        target_repository: &str,
        component_id: &str,
    ) -> Result<RelocationOutcome> {
        let component = self.get_component(component_id).await?;
        if component.assets.is_empty() {
            return Err(Error::NotFound(format!(
                "component {} has no assets to relocate",
                component_id
            )));
        }
        tracing::info!(
            component_id,
            source = source_repository,
            target = target_repository,
            format = %component.format,
            assets = component.assets.len(),
            "relocating component"
        );

        // Scratch space is removed when this binding drops, on every exit path.
        let scratch = tempfile::Builder::new()
            .prefix(&format!("relocate-{}-", component_id))
            .tempdir()?;

        let mut downloaded: Vec<DownloadedAsset> = Vec::new();
        for asset in &component.assets {
            let Some(url) = asset.download_url.as_deref() else {
                tracing::warn!(asset_id = %asset.id, "asset has no recorded download URL, omitting");
                continue;
            };
            let basename =
                remote_basename(&asset.path).unwrap_or_else(|| format!("asset_{}", asset.id));
            // Asset id in the name keeps concurrent relocations collision-free.
            let local = scratch.path().join(format!("{}_{}", asset.id, basename));
            match self.fetch_to_file(url, &local, None).await {
                Ok(()) => downloaded.push(DownloadedAsset {
                    local,
                    remote_path: asset.path.clone(),
                }),
                Err(e) => {
                    tracing::warn!(
                        asset_id = %asset.id,
                        error = %e,
                        "asset download failed, omitting from relocation"
                    );
                }
            }
        }
        if downloaded.is_empty() {
            return Err(Error::Other(format!(
                "none of the {} assets of component {} could be downloaded",
                component.assets.len(),
                component_id
            )));
        }

        let spec = if component.format == "maven2" {
            let group = component.group.clone().ok_or_else(|| {
                Error::Other(format!(
                    "coordinate component {} has no group",
                    component_id
                ))
            })?;
            let version = component.version.clone().ok_or_else(|| {
                Error::Other(format!(
                    "coordinate component {} has no version",
                    component_id
                ))
            })?;

            let tagged: Vec<(PathBuf, String)> = downloaded
                .iter()
                .map(|asset| (asset.local.clone(), asset.remote_path.clone()))
                .collect();
            let set = classify_coordinate_files(&tagged);

            let mut upload = CoordinateUpload::new(
                target_repository,
                group,
                component.name.clone(),
                version,
            );
            if let Some(primary) = set.primary {
                upload = upload.jar(primary);
            }
            if let Some(pom) = set.pom {
                upload = upload.pom(pom);
            }
            if let Some(sources) = set.sources {
                upload = upload.sources(sources);
            }
            if let Some(javadoc) = set.javadoc {
                upload = upload.javadoc(javadoc);
            }
            UploadSpec::Coordinate(upload)
        } else {
            let directory = Path::new(&downloaded[0].remote_path)
                .parent()
                .map(|parent| parent.to_string_lossy().into_owned())
                .unwrap_or_default();
            let files = downloaded
                .iter()
                .map(|asset| RawFile {
                    file: asset.local.clone(),
                    filename: remote_basename(&asset.remote_path),
                })
                .collect();
            UploadSpec::Path(PathUpload::new(target_repository, directory, files))
        };

        self.upload_component(&spec).await?;

        match self.delete_component(component_id).await {
            Ok(()) => {
                tracing::info!(
                    component_id,
                    source = source_repository,
                    target = target_repository,
                    "component relocated"
                );
                Ok(RelocationOutcome::FullyRelocated)
            }
            Err(e) => {
                tracing::warn!(
                    component_id,
                    source = source_repository,
                    error = %e,
                    "uploaded to target but failed to delete the source component"
                );
                Ok(RelocationOutcome::SourceNotRemoved)
            }
        }
    }
}
