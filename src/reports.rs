//! Scan-report storage convention.
//!
//! Security pipelines file their scan output under a deterministic directory,
//! `project/category/scan-date`, in a raw-format repository. This module
//! validates candidate files against an allow-list and size ceiling, packages
//! multi-file uploads into one zip when asked, delegates the transfer to the
//! path-addressed upload builder, and composes an advisory download URL for
//! the notification record. Uploading twice with the same key and filename
//! overwrites — raw-storage semantics; nothing here protects against it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::client::NexusClient;
use crate::config::ReportConfig;
use crate::error::{Error, ReportError, Result};
use crate::types::{
    BatchOutcome, BatchResults, Component, PathUpload, RawFile, UploadSpec, count_successes,
};

/// Known scan-tool identifiers, plus a generic fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportCategory {
    /// SonarQube
    Sonar,
    /// Checkmarx
    Checkmarx,
    /// Fortify
    Fortify,
    /// Coverity
    Coverity,
    /// Veracode
    Veracode,
    /// Anything outside the known tool set
    Generic,
}

impl ReportCategory {
    /// Stable identifier used in directory paths and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::Sonar => "sonar",
            ReportCategory::Checkmarx => "checkmarx",
            ReportCategory::Fortify => "fortify",
            ReportCategory::Coverity => "coverity",
            ReportCategory::Veracode => "veracode",
            ReportCategory::Generic => "generic",
        }
    }

    /// Human-readable label for notifications.
    pub fn label(&self) -> &'static str {
        match self {
            ReportCategory::Sonar => "SonarQube report",
            ReportCategory::Checkmarx => "Checkmarx report",
            ReportCategory::Fortify => "Fortify report",
            ReportCategory::Coverity => "Coverity report",
            ReportCategory::Veracode => "Veracode report",
            ReportCategory::Generic => "generic scan report",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportCategory {
    type Err = ReportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sonar" => Ok(ReportCategory::Sonar),
            "checkmarx" => Ok(ReportCategory::Checkmarx),
            "fortify" => Ok(ReportCategory::Fortify),
            "coverity" => Ok(ReportCategory::Coverity),
            "veracode" => Ok(ReportCategory::Veracode),
            "generic" => Ok(ReportCategory::Generic),
            other => Err(ReportError::UnknownCategory(other.to_string())),
        }
    }
}

/// The triple that addresses one report set.
///
/// Two uploads with the same key target the same directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportKey {
    /// Project the scan belongs to
    pub project: String,
    /// Scan tool that produced the report
    pub category: ReportCategory,
    /// Date of the scan
    pub scan_date: NaiveDate,
}

impl ReportKey {
    /// A key for the given scan date.
    pub fn new(
        project: impl Into<String>,
        category: ReportCategory,
        scan_date: NaiveDate,
    ) -> Self {
        Self {
            project: project.into(),
            category,
            scan_date,
        }
    }

    /// A key dated today (UTC).
    pub fn for_today(project: impl Into<String>, category: ReportCategory) -> Self {
        Self::new(project, category, chrono::Utc::now().date_naive())
    }

    /// The deterministic storage directory, `project/category/scan-date`.
    pub fn directory(&self) -> String {
        format!(
            "{}/{}/{}",
            self.project,
            self.category.as_str(),
            self.scan_date.format("%Y-%m-%d")
        )
    }

    /// Name of the transient archive for multi-file uploads.
    ///
    /// Embeds the full key so concurrent uploads of different report sets
    /// never collide on the archive path.
    pub fn archive_name(&self) -> String {
        format!(
            "{}_{}_{}.zip",
            self.project,
            self.category.as_str(),
            self.scan_date.format("%Y-%m-%d")
        )
    }
}

/// Options for one report upload.
#[derive(Clone, Debug)]
pub struct ReportUploadOptions {
    /// Target repository; defaults to the configured report repository
    pub repository: Option<String>,
    /// Package multiple files into a single zip before uploading (default: true)
    pub archive: bool,
    /// Extra key/value facts merged into the notification details
    pub extra_details: BTreeMap<String, String>,
}

impl Default for ReportUploadOptions {
    fn default() -> Self {
        Self {
            repository: None,
            archive: true,
            extra_details: BTreeMap::new(),
        }
    }
}

/// What one successful report upload produced.
#[derive(Clone, Debug)]
pub struct ReportUploadSummary {
    /// Repository the files landed in
    pub repository: String,
    /// Storage directory derived from the key
    pub directory: String,
    /// Filenames uploaded (one archive name when packaging was used)
    pub uploaded: Vec<String>,
    /// Advisory download URL for the first uploaded file; composed, not
    /// verified against the server
    pub download_url: Option<String>,
}

/// One entry of a batch report upload.
#[derive(Clone, Debug)]
pub struct ReportUploadJob {
    /// Where the report set files
    pub key: ReportKey,
    /// Local files to upload
    pub files: Vec<PathBuf>,
    /// Per-job options
    pub options: ReportUploadOptions,
}

/// Validate one candidate report file against the configured allow-list and
/// size ceiling.
pub(crate) fn validate_report_file(path: &Path, config: &ReportConfig) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|_| ReportError::MissingFile {
        path: path.to_path_buf(),
    })?;
    if !metadata.is_file() {
        return Err(ReportError::MissingFile {
            path: path.to_path_buf(),
        }
        .into());
    }
    let extension = extension_of(&path.to_string_lossy());
    if !config.allowed_extensions.contains(&extension) {
        return Err(ReportError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        }
        .into());
    }
    if metadata.len() > config.max_file_size {
        return Err(ReportError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: config.max_file_size,
        }
        .into());
    }
    Ok(())
}

/// Lowercased extension including the dot, empty when there is none.
fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn has_allowed_extension(path: &str, allowed: &[String]) -> bool {
    let extension = extension_of(path);
    !extension.is_empty() && allowed.contains(&extension)
}

/// Write all files into one zip, filenames preserved, paths flattened.
fn pack_reports(files: &[PathBuf], archive_path: &Path) -> Result<()> {
    let archive = std::fs::File::create(archive_path)?;
    let mut writer = zip::ZipWriter::new(archive);
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writer.start_file(name, options)?;
        let mut input = std::fs::File::open(path)?;
        std::io::copy(&mut input, &mut writer)?;
    }
    writer.finish()?;
    Ok(())
}

/// Removes the transient archive on drop, whatever the upload outcome.
struct TransientArchive {
    path: PathBuf,
}

impl Drop for TransientArchive {
    fn drop(&mut self) {
        if self.path.exists()
            && let Err(e) = std::fs::remove_file(&self.path)
        {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "could not remove transient archive"
            );
        }
    }
}

const REPORT_UPLOAD: &str = "scan report upload";

impl NexusClient {
    /// Upload one report set under its deterministic directory.
    ///
    /// Every file is validated before anything touches the network; the first
    /// invalid file rejects the whole operation with the reason. With more
    /// than one file and `options.archive`, all files are packaged into a
    /// single zip that is removed again after the upload regardless of
    /// outcome.
    pub async fn upload_report(
        &self,
        key: &ReportKey,
        files: &[PathBuf],
        options: &ReportUploadOptions,
    ) -> Result<ReportUploadSummary> {
        let repository = options
            .repository
            .clone()
            .unwrap_or_else(|| self.config.reports.default_repository.clone());
        let directory = key.directory();

        let mut details = BTreeMap::new();
        details.insert("project".to_string(), key.project.clone());
        details.insert(
            "category".to_string(),
            format!("{} ({})", key.category.label(), key.category),
        );
        details.insert(
            "scan_date".to_string(),
            key.scan_date.format("%Y-%m-%d").to_string(),
        );
        details.insert("repository".to_string(), repository.clone());
        details.insert("directory".to_string(), directory.clone());
        for (extra_key, extra_value) in &options.extra_details {
            details.insert(extra_key.clone(), extra_value.clone());
        }

        let prepared = self.prepare_report_files(key, files, options, &mut details);
        let (upload_paths, _transient) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::error!(directory = %directory, error = %e, "report upload rejected");
                self.notifier
                    .notify(REPORT_UPLOAD, false, &details, Some(&e.to_string()))
                    .await;
                return Err(e);
            }
        };

        let mut uploaded = Vec::new();
        let mut first_error: Option<Error> = None;
        for path in &upload_paths {
            let upload = PathUpload::new(
                repository.clone(),
                directory.clone(),
                vec![RawFile::new(path)],
            );
            match self.upload_component(&UploadSpec::Path(upload)).await {
                Ok(facts) => uploaded.extend(facts.files),
                Err(e) => {
                    tracing::error!(
                        file = %path.display(),
                        error = %e,
                        "report file upload failed"
                    );
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        details.insert("file_count".to_string(), files.len().to_string());
        details.insert("succeeded".to_string(), uploaded.len().to_string());
        details.insert(
            "failed".to_string(),
            (upload_paths.len() - uploaded.len()).to_string(),
        );

        match first_error {
            None => {
                let download_url = uploaded.first().map(|filename| {
                    format!(
                        "{}/repository/{}/{}/{}",
                        self.config.root_url.trim_end_matches('/'),
                        repository,
                        directory,
                        filename
                    )
                });
                tracing::info!(
                    directory = %directory,
                    files = uploaded.len(),
                    "scan report uploaded"
                );
                self.notifier
                    .notify(REPORT_UPLOAD, true, &details, None)
                    .await;
                Ok(ReportUploadSummary {
                    repository,
                    directory,
                    uploaded,
                    download_url,
                })
            }
            Some(e) => {
                self.notifier
                    .notify(REPORT_UPLOAD, false, &details, Some(&e.to_string()))
                    .await;
                Err(e)
            }
        }
    }

    /// Validate the input files and decide what actually gets uploaded:
    /// the files themselves, or one transient archive.
    fn prepare_report_files(
        &self,
        key: &ReportKey,
        files: &[PathBuf],
        options: &ReportUploadOptions,
        details: &mut BTreeMap<String, String>,
    ) -> Result<(Vec<PathBuf>, Option<TransientArchive>)> {
        if files.is_empty() {
            return Err(ReportError::NoFiles.into());
        }
        for file in files {
            validate_report_file(file, &self.config.reports)?;
        }

        if files.len() > 1 && options.archive {
            let parent = files[0].parent().unwrap_or_else(|| Path::new("."));
            let archive_path = parent.join(key.archive_name());
            // Guard first: a half-written archive is removed too.
            let transient = TransientArchive {
                path: archive_path.clone(),
            };
            pack_reports(files, &archive_path)?;
            tracing::info!(archive = %archive_path.display(), "created report archive");
            details.insert("archived".to_string(), "true".to_string());
            Ok((vec![archive_path], Some(transient)))
        } else {
            Ok((files.to_vec(), None))
        }
    }

    /// Upload many report sets, concurrently, keyed by their directories.
    ///
    /// An aggregate summary goes to the notification observer once all jobs
    /// have finished.
    pub async fn batch_upload_reports(&self, jobs: Vec<ReportUploadJob>) -> BatchResults {
        let total = jobs.len();
        tracing::info!(total, "starting batch report upload");

        let client = self.clone();
        let items = jobs
            .into_iter()
            .map(|job| (job.key.directory(), job))
            .collect();
        let results = crate::batch::run_batch(
            items,
            self.config.batch.report_workers,
            self.config.batch.unit_timeout,
            move |job: ReportUploadJob| {
                let client = client.clone();
                async move {
                    match client
                        .upload_report(&job.key, &job.files, &job.options)
                        .await
                    {
                        Ok(_) => BatchOutcome::Done,
                        Err(e) => BatchOutcome::Failed(e.to_string()),
                    }
                }
            },
        )
        .await;

        let succeeded = count_successes(&results);
        let failed = results.len() - succeeded;
        let mut details = BTreeMap::new();
        details.insert("total".to_string(), total.to_string());
        details.insert("succeeded".to_string(), succeeded.to_string());
        details.insert("failed".to_string(), failed.to_string());
        let error = (failed > 0).then(|| format!("{} of {} report sets failed", failed, total));
        self.notifier
            .notify(
                "batch scan report upload",
                failed == 0,
                &details,
                error.as_deref(),
            )
            .await;
        tracing::info!(succeeded, total, "batch report upload finished");
        results
    }

    /// List report components, optionally narrowed to a project and category.
    ///
    /// A component counts as a report when its name falls under the
    /// `project[/category]` prefix and at least one of its assets carries an
    /// allowed report extension.
    pub async fn list_reports(
        &self,
        project: Option<&str>,
        category: Option<ReportCategory>,
        repository: Option<&str>,
    ) -> Vec<Component> {
        let repository = repository.unwrap_or(&self.config.reports.default_repository);
        let prefix = match (project, category) {
            (Some(project), Some(category)) => format!("{}/{}", project, category.as_str()),
            (Some(project), None) => project.to_string(),
            _ => String::new(),
        };

        let components = self.list_all_components(repository).await;
        components
            .into_iter()
            .filter(|component| {
                (prefix.is_empty() || component.name.starts_with(&prefix))
                    && component.assets.iter().any(|asset| {
                        has_allowed_extension(&asset.path, &self.config.reports.allowed_extensions)
                    })
            })
            .collect()
    }

    /// Download a report set: one named file, or everything under the key's
    /// directory.
    ///
    /// Files land in `dest_dir`, defaulting to
    /// `./sast_downloads/<project>/<category>/<scan-date>`. Individual asset
    /// failures are logged and skipped; the returned list holds what was
    /// actually saved.
    pub async fn download_reports(
        &self,
        key: &ReportKey,
        filename: Option<&str>,
        repository: Option<&str>,
        dest_dir: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        let repository = repository.unwrap_or(&self.config.reports.default_repository);
        let directory = key.directory();
        let dest_dir = match dest_dir {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("sast_downloads")
                .join(&key.project)
                .join(key.category.as_str())
                .join(key.scan_date.format("%Y-%m-%d").to_string()),
        };

        let components = self.list_all_components(repository).await;
        let matching: Vec<_> = components
            .iter()
            .flat_map(|component| component.assets.iter())
            .filter(|asset| {
                asset.path.starts_with(&format!("{}/", directory))
                    && filename.is_none_or(|wanted| {
                        Path::new(&asset.path)
                            .file_name()
                            .is_some_and(|name| name.to_string_lossy() == wanted)
                    })
            })
            .collect();
        if matching.is_empty() {
            return Err(Error::NotFound(format!(
                "no report assets under {}/{}",
                repository, directory
            )));
        }

        tokio::fs::create_dir_all(&dest_dir).await?;
        let mut saved = Vec::new();
        for asset in matching {
            let Some(url) = asset.download_url.as_deref() else {
                tracing::warn!(asset_id = %asset.id, "asset has no recorded download URL, skipping");
                continue;
            };
            let name = Path::new(&asset.path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("asset_{}", asset.id));
            let dest = dest_dir.join(name);
            match self.fetch_to_file(url, &dest, None).await {
                Ok(()) => saved.push(dest),
                Err(e) => {
                    tracing::warn!(
                        asset_id = %asset.id,
                        error = %e,
                        "report asset download failed, skipping"
                    );
                }
            }
        }
        tracing::info!(
            directory = %directory,
            saved = saved.len(),
            "report download finished"
        );
        Ok(saved)
    }
}
