//! Notification observer interface
//!
//! The upload and report layers prepare fact records (operation name, outcome,
//! a string map of details) and hand them to a [`Notifier`]. Whether anything
//! is actually delivered, and how, is the observer's decision; the core never
//! blocks on or fails because of a notification.

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Observer for operation outcomes.
///
/// Implementations must not panic; a notification failure is the observer's
/// own problem to log and swallow.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Record the outcome of one operation.
    ///
    /// `details` carries operation-specific key/value facts (repository,
    /// coordinates, file counts); `error` is present only on failure.
    async fn notify(
        &self,
        operation: &str,
        success: bool,
        details: &BTreeMap<String, String>,
        error: Option<&str>,
    );
}

/// Default observer: writes outcomes to the tracing log and nothing else.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        operation: &str,
        success: bool,
        details: &BTreeMap<String, String>,
        error: Option<&str>,
    ) {
        if success {
            tracing::info!(operation, ?details, "operation succeeded");
        } else {
            tracing::error!(operation, ?details, error, "operation failed");
        }
    }
}
