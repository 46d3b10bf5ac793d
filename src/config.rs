//! Configuration types for nexus-client
//!
//! The repository endpoint, the named-account credential table, timeouts, and
//! batch-concurrency defaults all live in one explicit [`Config`] value that is
//! constructed once and passed into [`NexusClient::new`](crate::NexusClient::new).
//! There is no global state; two clients with different configs can coexist in
//! one process (and in one test).

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};

use crate::error::{Error, Result};

/// Basic-auth credentials for one named repository account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    /// Username sent in the HTTP basic-auth header
    pub username: String,
    /// Password sent in the HTTP basic-auth header
    pub password: String,
}

/// HTTP request behavior (timeouts)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for general requests such as uploads and deletes (default: 120s)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// Timeout for metadata calls — listings and searches (default: 60s)
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            metadata_timeout: default_metadata_timeout(),
        }
    }
}

/// Batch-orchestration behavior (worker counts, per-unit timeout)
///
/// Used as a nested sub-config within [`Config`]. Worker counts bound the
/// number of concurrently in-flight units; they are deliberately small so a
/// batch never floods the repository with connections.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum concurrent asset downloads in a batch (default: 5)
    #[serde(default = "default_download_workers")]
    pub download_workers: usize,

    /// Maximum concurrent component deletions in a batch (default: 3)
    #[serde(default = "default_delete_workers")]
    pub delete_workers: usize,

    /// Maximum concurrent report uploads in a batch (default: 3)
    #[serde(default = "default_report_workers")]
    pub report_workers: usize,

    /// Timeout applied to each batch unit (default: 300s)
    ///
    /// A unit that exceeds this is recorded as failed; units already
    /// dispatched cannot be aborted mid-flight.
    #[serde(default = "default_unit_timeout")]
    pub unit_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            download_workers: default_download_workers(),
            delete_workers: default_delete_workers(),
            report_workers: default_report_workers(),
            unit_timeout: default_unit_timeout(),
        }
    }
}

/// Scan-report convention settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Allowed report file extensions, lowercased, including the dot
    #[serde(default = "default_report_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Maximum size of a single report file in bytes (default: 50 MiB)
    #[serde(default = "default_max_report_size")]
    pub max_file_size: u64,

    /// Repository that receives scan reports when none is named explicitly
    #[serde(default = "default_report_repository")]
    pub default_repository: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_report_extensions(),
            max_file_size: default_max_report_size(),
            default_repository: default_report_repository(),
        }
    }
}

/// Main configuration for [`NexusClient`](crate::NexusClient)
///
/// Fields are organized into logical sub-configs:
/// - [`http`](HttpConfig) — request timeouts
/// - [`batch`](BatchConfig) — batch worker counts and per-unit timeout
/// - [`reports`](ReportConfig) — scan-report validation and defaults
///
/// The sub-config fields are flattened for serialization, so the JSON/TOML
/// format stays flat (no nesting).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Repository service root, e.g. `http://nexus.example.com:8081`
    pub root_url: String,

    /// Name of the account used when a call does not override it (default: "admin")
    #[serde(default = "default_account_name")]
    pub default_account: String,

    /// Named accounts available for signing requests
    #[serde(default)]
    pub accounts: HashMap<String, Account>,

    /// Request timeouts
    #[serde(flatten)]
    pub http: HttpConfig,

    /// Batch worker counts and per-unit timeout
    #[serde(flatten)]
    pub batch: BatchConfig,

    /// Scan-report validation and defaults
    #[serde(default)]
    pub reports: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_url: String::new(),
            default_account: default_account_name(),
            accounts: HashMap::new(),
            http: HttpConfig::default(),
            batch: BatchConfig::default(),
            reports: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Build a config with one account, which also becomes the default account.
    ///
    /// Covers the common case of a pipeline talking to one repository with one
    /// service identity. More accounts can be inserted into
    /// [`accounts`](Config::accounts) afterwards.
    pub fn with_account(
        root_url: impl Into<String>,
        account: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let account = account.into();
        let mut accounts = HashMap::new();
        accounts.insert(
            account.clone(),
            Account {
                username: username.into(),
                password: password.into(),
            },
        );
        Self {
            root_url: root_url.into(),
            default_account: account,
            accounts,
            ..Self::default()
        }
    }

    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.root_url.trim().is_empty() {
            return Err(Error::Config {
                message: "root_url must not be empty".to_string(),
                key: Some("root_url".to_string()),
            });
        }
        url::Url::parse(&self.root_url).map_err(|e| Error::Config {
            message: format!("root_url is not a valid URL: {}", e),
            key: Some("root_url".to_string()),
        })?;
        if !self.accounts.contains_key(&self.default_account) {
            return Err(Error::Config {
                message: format!(
                    "default_account {:?} has no entry in accounts",
                    self.default_account
                ),
                key: Some("default_account".to_string()),
            });
        }
        for (key, value) in [
            ("download_workers", self.batch.download_workers),
            ("delete_workers", self.batch.delete_workers),
            ("report_workers", self.batch.report_workers),
        ] {
            if value == 0 {
                return Err(Error::Config {
                    message: format!("{} must be at least 1", key),
                    key: Some(key.to_string()),
                });
            }
        }
        if self.reports.max_file_size == 0 {
            return Err(Error::Config {
                message: "reports.max_file_size must be greater than zero".to_string(),
                key: Some("reports.max_file_size".to_string()),
            });
        }
        Ok(())
    }
}

fn default_account_name() -> String {
    "admin".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_metadata_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_download_workers() -> usize {
    5
}

fn default_delete_workers() -> usize {
    3
}

fn default_report_workers() -> usize {
    3
}

fn default_unit_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_report_extensions() -> Vec<String> {
    [".pdf", ".doc", ".docx", ".txt", ".md", ".html", ".xml", ".json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_report_size() -> u64 {
    50 * 1024 * 1024
}

fn default_report_repository() -> String {
    "sast-reports-raw".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn with_account_sets_default_account() {
        let config = Config::with_account("http://nexus.local:8081", "deploy", "deploy", "s3cret");
        assert_eq!(config.default_account, "deploy");
        assert_eq!(config.accounts["deploy"].username, "deploy");
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_root_url() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(k), .. } if k == "root_url"));
    }

    #[test]
    fn validate_rejects_unparseable_root_url() {
        let mut config = Config::with_account("http://ok", "admin", "admin", "admin123");
        config.root_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_default_account() {
        let mut config = Config::with_account("http://nexus.local", "admin", "admin", "admin123");
        config.default_account = "deploy".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(k), .. } if k == "default_account"));
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = Config::with_account("http://nexus.local", "admin", "admin", "admin123");
        config.batch.delete_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.http.request_timeout, Duration::from_secs(120));
        assert_eq!(config.http.metadata_timeout, Duration::from_secs(60));
        assert_eq!(config.batch.download_workers, 5);
        assert_eq!(config.batch.delete_workers, 3);
        assert_eq!(config.batch.unit_timeout, Duration::from_secs(300));
        assert_eq!(config.reports.max_file_size, 50 * 1024 * 1024);
        assert_eq!(config.reports.default_repository, "sast-reports-raw");
        assert!(config.reports.allowed_extensions.contains(&".pdf".to_string()));
    }
}
