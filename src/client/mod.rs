//! Nexus REST client (decomposed into focused submodules)
//!
//! [`NexusClient`] is a cheap-to-clone handle: the underlying HTTP connection
//! pool, the configuration, and the notification observer are all shared. The
//! batch layer clones it freely into concurrently running units.

mod assets;
mod components;
mod download;
pub(crate) mod exec;
pub(crate) mod paging;
pub(crate) mod upload;

use std::sync::Arc;

use crate::config::{Account, Config};
use crate::error::{Error, Result};
use crate::notify::{LogNotifier, Notifier};

/// Client for one artifact-repository service.
///
/// Holds the credential table and timeouts from [`Config`] and signs every
/// request with basic-auth credentials resolved per named account. Redirect
/// following is disabled on the underlying HTTP client: the
/// search-and-download protocol requires observing the `302` and issuing a
/// second, separately authenticated request against its `Location`.
#[derive(Clone)]
pub struct NexusClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Arc<Config>,
    pub(crate) notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for NexusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexusClient")
            .field("root_url", &self.config.root_url)
            .field("default_account", &self.config.default_account)
            .finish_non_exhaustive()
    }
}

impl NexusClient {
    /// Create a client from a validated configuration.
    ///
    /// Fails if the configuration is invalid or the HTTP client cannot be
    /// constructed. Outcomes are reported to a [`LogNotifier`] until
    /// [`with_notifier`](Self::with_notifier) installs something else.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
            notifier: Arc::new(LogNotifier),
        })
    }

    /// Replace the notification observer.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a named account, falling back to the configured default.
    pub(crate) fn account(&self, name: Option<&str>) -> Result<&Account> {
        let name = name.unwrap_or(&self.config.default_account);
        self.config.accounts.get(name).ok_or_else(|| Error::Config {
            message: format!("account {:?} has no entry in accounts", name),
            key: Some("accounts".to_string()),
        })
    }
}
