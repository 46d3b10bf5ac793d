//! # nexus-client
//!
//! Batch-oriented client library for Sonatype Nexus artifact repositories.
//!
//! ## Design Philosophy
//!
//! nexus-client is designed to be:
//! - **Pipeline-first** - No CLI or prompts, purely a Rust crate for embedding
//!   in build and security pipelines
//! - **Explicit configuration** - One [`Config`] value per client, no global
//!   credential state
//! - **Failure-isolating** - Batch operations return one outcome per input
//!   key; a failing unit never aborts its siblings
//! - **Observable** - Operations prepare fact records for a pluggable
//!   [`Notifier`]; the core never decides whether anything is delivered
//!
//! ## Quick Start
//!
//! ```no_run
//! use nexus_client::{Config, NexusClient, ReportCategory, ReportKey, ReportUploadOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::with_account(
//!         "http://nexus.example.com:8081",
//!         "admin",
//!         "admin",
//!         "admin123",
//!     );
//!     let client = NexusClient::new(config)?;
//!
//!     // Publish today's scan reports under acme-portal/sonar/<date>
//!     let key = ReportKey::for_today("acme-portal", ReportCategory::Sonar);
//!     let summary = client
//!         .upload_report(
//!             &key,
//!             &["scan.pdf".into(), "findings.json".into()],
//!             &ReportUploadOptions::default(),
//!         )
//!         .await?;
//!     println!("stored under {}", summary.directory);
//!
//!     // Retire everything but the five newest versions
//!     client
//!         .cleanup_old_versions("maven-releases", "com.example", "app", 5)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Bounded-concurrency batch orchestration
pub mod batch;
/// Repository REST client (decomposed into focused submodules)
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Notification observer interface
pub mod notify;
/// Cross-repository relocation workflow
pub mod relocate;
/// Scan-report storage convention
pub mod reports;
/// Version retention policy
pub mod retention;
/// Core types
pub mod types;

// Re-export commonly used types
pub use batch::run_batch;
pub use client::NexusClient;
pub use config::{Account, BatchConfig, Config, HttpConfig, ReportConfig};
pub use error::{Error, ReportError, Result, UploadError};
pub use notify::{LogNotifier, Notifier};
pub use relocate::RelocationOutcome;
pub use reports::{
    ReportCategory, ReportKey, ReportUploadJob, ReportUploadOptions, ReportUploadSummary,
};
pub use retention::RetentionReport;
pub use types::{
    Asset, BatchOutcome, BatchResults, Component, ConventionFilter, CoordinateAsset,
    CoordinateUpload, Page, PathUpload, RawFile, SearchQuery, UploadFacts, UploadSpec,
    count_successes,
};
