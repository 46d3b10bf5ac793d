//! Core types for nexus-client

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// One physical file belonging to a [`Component`], addressed by a
/// repository-relative path.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Server-assigned asset identity
    pub id: String,
    /// Repository-relative location, e.g. `com/example/app/1.0/app-1.0.jar`
    pub path: String,
    /// Direct download location recorded by the server
    #[serde(default)]
    pub download_url: Option<String>,
    /// Size in bytes, when the server reports it
    #[serde(default)]
    pub size: Option<u64>,
    /// Last-modified timestamp as reported by the server
    #[serde(default)]
    pub last_modified: Option<String>,
    /// Repository the asset lives in
    #[serde(default)]
    pub repository: Option<String>,
}

/// A named, versioned artifact record owning one or more [`Asset`]s.
///
/// Components are server-owned: the client never caches them beyond one call
/// chain, and they are immutable once created except via delete-and-recreate.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Server-assigned component identity
    pub id: String,
    /// Coordinate group (absent for path-addressed formats)
    #[serde(default)]
    pub group: Option<String>,
    /// Component name
    pub name: String,
    /// Coordinate version (absent for path-addressed formats)
    #[serde(default)]
    pub version: Option<String>,
    /// Artifact convention tag, e.g. `maven2` or `raw`
    #[serde(default)]
    pub format: String,
    /// Repository the component lives in
    #[serde(default)]
    pub repository: String,
    /// Assets owned by this component, in server order
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// One page of a listing or search result.
///
/// `continuation_token` is an opaque cursor; its absence means end-of-stream.
/// Item order is server order, and items are not guaranteed globally unique
/// across pages beyond what the server's token contract promises.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Opaque cursor for the next page, absent on the last page
    #[serde(default)]
    pub continuation_token: Option<String>,
}

/// One asset attached to a coordinate-addressed upload.
///
/// Position within [`CoordinateUpload::assets`] determines the 1-based numeric
/// suffix used on the wire (`maven2.asset1`, `maven2.asset2`, …), so ordering
/// is significant.
#[derive(Clone, Debug)]
pub struct CoordinateAsset {
    /// Local file to stream
    pub file: PathBuf,
    /// Wire extension field, e.g. `jar` or `pom`
    pub extension: String,
    /// Secondary-artifact qualifier, e.g. `sources` or `javadoc`
    pub classifier: Option<String>,
}

/// A coordinate-addressed ("Maven-style") upload.
#[derive(Clone, Debug)]
pub struct CoordinateUpload {
    /// Target repository name
    pub repository: String,
    /// Coordinate group, e.g. `com.example`
    pub group: String,
    /// Coordinate artifact name
    pub artifact: String,
    /// Coordinate version
    pub version: String,
    /// Packaging type (default `jar`)
    pub packaging: String,
    /// Ask the server to generate a POM when none is attached
    pub generate_pom: bool,
    /// Assets in wire order
    pub assets: Vec<CoordinateAsset>,
}

impl CoordinateUpload {
    /// Start a coordinate upload with `jar` packaging and no attached assets.
    pub fn new(
        repository: impl Into<String>,
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            packaging: "jar".to_string(),
            generate_pom: false,
            assets: Vec::new(),
        }
    }

    /// Set the packaging type.
    pub fn packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    /// Ask the server to generate a POM.
    pub fn generate_pom(mut self, generate: bool) -> Self {
        self.generate_pom = generate;
        self
    }

    /// Attach the primary jar.
    pub fn jar(self, file: impl Into<PathBuf>) -> Self {
        self.asset(file, "jar", None)
    }

    /// Attach the POM.
    pub fn pom(self, file: impl Into<PathBuf>) -> Self {
        self.asset(file, "pom", None)
    }

    /// Attach the sources jar.
    pub fn sources(self, file: impl Into<PathBuf>) -> Self {
        self.asset(file, "jar", Some("sources"))
    }

    /// Attach the javadoc jar.
    pub fn javadoc(self, file: impl Into<PathBuf>) -> Self {
        self.asset(file, "jar", Some("javadoc"))
    }

    /// Attach an arbitrary asset; wire position follows call order.
    pub fn asset(
        mut self,
        file: impl Into<PathBuf>,
        extension: impl Into<String>,
        classifier: Option<&str>,
    ) -> Self {
        self.assets.push(CoordinateAsset {
            file: file.into(),
            extension: extension.into(),
            classifier: classifier.map(str::to_string),
        });
        self
    }
}

/// One file attached to a path-addressed upload.
#[derive(Clone, Debug)]
pub struct RawFile {
    /// Local file to stream
    pub file: PathBuf,
    /// Filename recorded in the repository; defaults to the file's basename
    pub filename: Option<String>,
}

impl RawFile {
    /// Attach a file under its own basename.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            filename: None,
        }
    }

    /// The filename that will be recorded in the repository.
    pub fn effective_filename(&self) -> String {
        match &self.filename {
            Some(name) => name.clone(),
            None => self
                .file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// A path-addressed ("raw") upload.
#[derive(Clone, Debug)]
pub struct PathUpload {
    /// Target repository name
    pub repository: String,
    /// Directory the files land in, e.g. `acme-portal/sonar/2026-08-07`
    pub directory: String,
    /// Files in wire order
    pub files: Vec<RawFile>,
}

impl PathUpload {
    /// A path upload of the given files into one directory.
    pub fn new(
        repository: impl Into<String>,
        directory: impl Into<String>,
        files: Vec<RawFile>,
    ) -> Self {
        Self {
            repository: repository.into(),
            directory: directory.into(),
            files,
        }
    }
}

/// The two artifact conventions understood by the upload protocol builder.
#[derive(Clone, Debug)]
pub enum UploadSpec {
    /// Coordinate-addressed (group/artifact/version) upload
    Coordinate(CoordinateUpload),
    /// Path-addressed (directory/filename) upload
    Path(PathUpload),
}

/// Convention-specific search keys.
///
/// Each variant holds only the fields meaningful to that convention; anything
/// truly free-form goes through [`SearchQuery::extra`].
#[derive(Clone, Debug)]
pub enum ConventionFilter {
    /// Coordinate-addressed search keys (`maven.extension`, `maven.classifier`)
    Coordinate {
        /// File extension to match, e.g. `jar`
        extension: Option<String>,
        /// Classifier to match; `Some("")` matches assets with no classifier,
        /// `None` omits the key entirely
        classifier: Option<String>,
    },
    /// Path-addressed search (matches `format=raw` components)
    Path,
}

/// Parameters for component and asset searches.
#[derive(Clone, Debug, Default)]
pub struct SearchQuery {
    /// Restrict to one repository
    pub repository: Option<String>,
    /// Coordinate group to match
    pub group: Option<String>,
    /// Component name to match
    pub name: Option<String>,
    /// Version to match
    pub version: Option<String>,
    /// Convention-specific keys
    pub convention: Option<ConventionFilter>,
    /// Verbatim pass-through query keys (sorted for a stable wire order)
    pub extra: BTreeMap<String, String>,
}

impl SearchQuery {
    /// Search within one repository.
    pub fn in_repository(repository: impl Into<String>) -> Self {
        Self {
            repository: Some(repository.into()),
            ..Self::default()
        }
    }

    /// The query-string pairs for this search, in a deterministic order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(repository) = &self.repository {
            pairs.push(("repository".to_string(), repository.clone()));
        }
        if let Some(group) = &self.group {
            pairs.push(("group".to_string(), group.clone()));
        }
        if let Some(name) = &self.name {
            pairs.push(("name".to_string(), name.clone()));
        }
        if let Some(version) = &self.version {
            pairs.push(("version".to_string(), version.clone()));
        }
        match &self.convention {
            Some(ConventionFilter::Coordinate {
                extension,
                classifier,
            }) => {
                pairs.push(("format".to_string(), "maven2".to_string()));
                if let Some(extension) = extension {
                    pairs.push(("maven.extension".to_string(), extension.clone()));
                }
                if let Some(classifier) = classifier {
                    pairs.push(("maven.classifier".to_string(), classifier.clone()));
                }
            }
            Some(ConventionFilter::Path) => {
                pairs.push(("format".to_string(), "raw".to_string()));
            }
            None => {}
        }
        for (key, value) in &self.extra {
            pairs.push((key.clone(), value.clone()));
        }
        pairs
    }
}

/// Outcome of one batch unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The unit completed with no artifact to report
    Done,
    /// The unit completed and produced a local file
    Saved(PathBuf),
    /// The unit failed, panicked, or timed out
    Failed(String),
}

impl BatchOutcome {
    /// Whether this outcome counts as a success.
    pub fn is_success(&self) -> bool {
        !matches!(self, BatchOutcome::Failed(_))
    }
}

/// Per-key results of a batch run: exactly one entry per input key.
pub type BatchResults = HashMap<String, BatchOutcome>;

/// Count the successful outcomes in a batch result map.
pub fn count_successes(results: &BatchResults) -> usize {
    results.values().filter(|o| o.is_success()).count()
}

/// Fact record describing one completed (or attempted) upload.
///
/// The upload layer prepares this for the notification observer; whether and
/// how it is delivered is the observer's decision, not the core's.
#[derive(Clone, Debug)]
pub struct UploadFacts {
    /// Human-readable operation name, e.g. `maven component upload`
    pub operation: String,
    /// Target repository
    pub repository: String,
    /// Coordinates (`group:artifact:version`) or target directory
    pub target: String,
    /// Names of the files attached to the request
    pub files: Vec<String>,
    /// Total bytes across all attached files
    pub total_bytes: u64,
}

impl UploadFacts {
    /// Render the facts as the string map the notification interface consumes.
    pub fn details(&self) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        details.insert("repository".to_string(), self.repository.clone());
        details.insert("target".to_string(), self.target.clone());
        details.insert("file_count".to_string(), self.files.len().to_string());
        details.insert("files".to_string(), self.files.join(", "));
        details.insert("total_bytes".to_string(), self.total_bytes.to_string());
        details
    }
}
