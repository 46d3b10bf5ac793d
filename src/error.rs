//! Error types for nexus-client
//!
//! This module provides comprehensive error handling for the library, including:
//! - Domain-specific error types (Upload, Report)
//! - Protocol failures carrying the offending HTTP status and body text
//! - Local validation failures detected before any network call
//!
//! The primitive layers never panic past their boundary: every failure is a
//! value. Batch layers convert these values into per-key outcomes rather than
//! aborting the whole batch.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for nexus-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nexus-client
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "root_url")
        key: Option<String>,
    },

    /// Network, TLS, or timeout error from the HTTP transport
    ///
    /// Always terminal for the one request that produced it; the executor
    /// never retries.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response status outside the accepted set {200, 201, 204, 302}
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code returned by the server
        status: u16,
        /// Response body text, kept for diagnostics
        body: String,
    },

    /// The server answered with a success shape the protocol does not allow
    /// at this point (e.g. a 200 where a redirect was required)
    #[error("unexpected response from {path}: {reason}")]
    UnexpectedResponse {
        /// The operation path that produced the response
        path: String,
        /// What was expected instead
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A URL could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A component, asset, or recorded download location was not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Upload validation or protocol-assembly error
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    /// Scan-report convention error
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// Archive packaging error
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Upload-related errors
///
/// All variants are detected locally, before any network call is issued.
#[derive(Debug, Error)]
pub enum UploadError {
    /// An input file does not exist
    #[error("input file not found: {path}")]
    MissingFile {
        /// The path that was expected to be a readable file
        path: PathBuf,
    },

    /// An input path exists but is not a regular file
    #[error("not a regular file: {path}")]
    NotAFile {
        /// The offending path
        path: PathBuf,
    },

    /// The upload spec carries no files at all
    #[error("upload spec contains no files")]
    NoFiles,
}

/// Scan-report validation errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// A report file does not exist
    #[error("report file not found: {path}")]
    MissingFile {
        /// The path that was expected to exist
        path: PathBuf,
    },

    /// A report file's extension is not on the allow-list
    #[error("unsupported report format {extension:?}: {path}")]
    UnsupportedFormat {
        /// The offending file
        path: PathBuf,
        /// The rejected extension (lowercased, including the dot)
        extension: String,
    },

    /// A report file exceeds the configured size ceiling
    #[error("report file too large: {path} ({size} > {limit} bytes)")]
    FileTooLarge {
        /// The offending file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured maximum in bytes
        limit: u64,
    },

    /// No report files were supplied
    #[error("no report files supplied")]
    NoFiles,

    /// A category identifier outside the known tool set
    #[error("unknown report category: {0}")]
    UnknownCategory(String),
}
