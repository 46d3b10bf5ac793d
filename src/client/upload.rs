//! Upload protocol assembly for the supported artifact conventions.
//!
//! Planning is split from transmission: `plan_*` functions produce the
//! ordered multipart field set as plain data (so the 1-based asset numbering
//! the wire protocol depends on is testable without I/O), and the form is
//! only assembled, with files opened for streaming, once local validation
//! has passed. File handles are owned by the request body and released on
//! every exit path when it drops.

use reqwest::Body;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;

use super::NexusClient;
use super::exec::ApiRequest;
use crate::error::{Error, Result, UploadError};
use crate::types::{CoordinateUpload, PathUpload, UploadFacts, UploadSpec};

/// One file part of a planned upload.
#[derive(Clone, Debug)]
pub(crate) struct FileField {
    /// Multipart field name, e.g. `maven2.asset1`
    pub name: String,
    /// Local file to stream
    pub path: PathBuf,
    /// Filename advertised in the part
    pub filename: String,
}

/// Ordered multipart field plan for one upload.
#[derive(Clone, Debug, Default)]
pub(crate) struct UploadPlan {
    pub text_fields: Vec<(String, String)>,
    pub file_fields: Vec<FileField>,
}

impl UploadPlan {
    fn file_names(&self) -> Vec<String> {
        self.file_fields
            .iter()
            .map(|field| field.filename.clone())
            .collect()
    }
}

/// Field plan for a coordinate-addressed upload.
///
/// Asset numbering starts at 1 and increments in list order; the numbering is
/// part of the wire protocol and must not be reordered.
pub(crate) fn plan_coordinate_fields(upload: &CoordinateUpload) -> UploadPlan {
    let mut plan = UploadPlan {
        text_fields: vec![
            ("maven2.groupId".to_string(), upload.group.clone()),
            ("maven2.artifactId".to_string(), upload.artifact.clone()),
            ("maven2.version".to_string(), upload.version.clone()),
            ("maven2.packaging".to_string(), upload.packaging.clone()),
            (
                "maven2.generate-pom".to_string(),
                upload.generate_pom.to_string(),
            ),
        ],
        file_fields: Vec::new(),
    };

    for (index, asset) in upload.assets.iter().enumerate() {
        let number = index + 1;
        plan.file_fields.push(FileField {
            name: format!("maven2.asset{}", number),
            path: asset.file.clone(),
            filename: basename(&asset.file),
        });
        plan.text_fields.push((
            format!("maven2.asset{}.extension", number),
            asset.extension.clone(),
        ));
        if let Some(classifier) = &asset.classifier {
            plan.text_fields.push((
                format!("maven2.asset{}.classifier", number),
                classifier.clone(),
            ));
        }
    }

    plan
}

/// Field plan for a path-addressed upload.
pub(crate) fn plan_path_fields(upload: &PathUpload) -> UploadPlan {
    let mut plan = UploadPlan {
        text_fields: vec![("raw.directory".to_string(), upload.directory.clone())],
        file_fields: Vec::new(),
    };

    for (index, file) in upload.files.iter().enumerate() {
        let number = index + 1;
        let filename = file.effective_filename();
        plan.file_fields.push(FileField {
            name: format!("raw.asset{}", number),
            path: file.file.clone(),
            filename: filename.clone(),
        });
        plan.text_fields
            .push((format!("raw.asset{}.filename", number), filename));
    }

    plan
}

fn plan_for(spec: &UploadSpec) -> UploadPlan {
    match spec {
        UploadSpec::Coordinate(upload) => plan_coordinate_fields(upload),
        UploadSpec::Path(upload) => plan_path_fields(upload),
    }
}

/// Check every planned file locally, before any network call.
///
/// Returns the total byte count across all files.
fn validate_plan(plan: &UploadPlan) -> Result<u64> {
    if plan.file_fields.is_empty() {
        return Err(UploadError::NoFiles.into());
    }
    let mut total = 0u64;
    for field in &plan.file_fields {
        let metadata = std::fs::metadata(&field.path).map_err(|_| UploadError::MissingFile {
            path: field.path.clone(),
        })?;
        if !metadata.is_file() {
            return Err(UploadError::NotAFile {
                path: field.path.clone(),
            }
            .into());
        }
        total += metadata.len();
    }
    Ok(total)
}

/// Assemble the multipart form, opening each file for streaming.
async fn multipart_form(plan: &UploadPlan) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in &plan.text_fields {
        form = form.text(name.clone(), value.clone());
    }
    for field in &plan.file_fields {
        let file = tokio::fs::File::open(&field.path).await?;
        let length = file.metadata().await?.len();
        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), length)
            .file_name(field.filename.clone());
        form = form.part(field.name.clone(), part);
    }
    Ok(form)
}

pub(crate) fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl NexusClient {
    /// Upload one component according to its convention.
    ///
    /// Exactly one POST is issued. Local validation (files exist and are
    /// regular files) runs first and fails the operation before anything
    /// touches the network. Whatever the outcome, the prepared fact record is
    /// handed to the notification observer.
    pub async fn upload_component(&self, spec: &UploadSpec) -> Result<UploadFacts> {
        let (operation, repository, target) = match spec {
            UploadSpec::Coordinate(upload) => (
                "maven component upload",
                upload.repository.clone(),
                format!("{}:{}:{}", upload.group, upload.artifact, upload.version),
            ),
            UploadSpec::Path(upload) => (
                "raw component upload",
                upload.repository.clone(),
                upload.directory.clone(),
            ),
        };
        self.upload_plan(operation, &repository, target, plan_for(spec))
            .await
    }

    /// Upload one npm package tarball (`npm.asset`, no text fields).
    pub async fn upload_npm_package(
        &self,
        repository: &str,
        package: &Path,
    ) -> Result<UploadFacts> {
        let filename = basename(package);
        let plan = UploadPlan {
            text_fields: Vec::new(),
            file_fields: vec![FileField {
                name: "npm.asset".to_string(),
                path: package.to_path_buf(),
                filename: filename.clone(),
            }],
        };
        self.upload_plan("npm package upload", repository, filename, plan)
            .await
    }

    async fn upload_plan(
        &self,
        operation: &str,
        repository: &str,
        target: String,
        plan: UploadPlan,
    ) -> Result<UploadFacts> {
        let mut facts = UploadFacts {
            operation: operation.to_string(),
            repository: repository.to_string(),
            target,
            files: plan.file_names(),
            total_bytes: 0,
        };

        facts.total_bytes = match validate_plan(&plan) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(
                    repository,
                    target = %facts.target,
                    error = %e,
                    "upload rejected by local validation"
                );
                self.notifier
                    .notify(operation, false, &facts.details(), Some(&e.to_string()))
                    .await;
                return Err(e);
            }
        };

        let path = format!("/components?repository={}", urlencoding::encode(repository));
        let result = async {
            let form = multipart_form(&plan).await?;
            self.execute(ApiRequest::post_form(&path, form)).await?;
            Ok::<_, Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    repository,
                    target = %facts.target,
                    files = facts.files.len(),
                    bytes = facts.total_bytes,
                    "component uploaded"
                );
                self.notifier
                    .notify(operation, true, &facts.details(), None)
                    .await;
                Ok(facts)
            }
            Err(e) => {
                self.notifier
                    .notify(operation, false, &facts.details(), Some(&e.to_string()))
                    .await;
                Err(e)
            }
        }
    }
}
