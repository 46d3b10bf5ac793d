//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use nexus_client::{Config, NexusClient, Notifier};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

/// Client wired to a mock server with the default `admin` account.
pub fn client_for(server: &MockServer) -> NexusClient {
    let config = Config::with_account(server.uri(), "admin", "admin", "admin123");
    NexusClient::new(config).expect("config must validate")
}

/// One notification call captured by [`RecordingNotifier`].
#[derive(Clone, Debug)]
pub struct NotifyCall {
    pub operation: String,
    pub success: bool,
    pub details: BTreeMap<String, String>,
    pub error: Option<String>,
}

/// Observer that records every call, for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub calls: Arc<Mutex<Vec<NotifyCall>>>,
}

impl RecordingNotifier {
    pub fn calls(&self) -> Vec<NotifyCall> {
        self.calls.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        operation: &str,
        success: bool,
        details: &BTreeMap<String, String>,
        error: Option<&str>,
    ) {
        self.calls.lock().expect("notifier mutex poisoned").push(NotifyCall {
            operation: operation.to_string(),
            success,
            details: details.clone(),
            error: error.map(str::to_string),
        });
    }
}

/// JSON for one asset record.
pub fn asset_json(id: &str, path: &str, download_url: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "path": path,
        "downloadUrl": download_url,
        "size": 128,
        "repository": "test-repo"
    })
}

/// JSON for one component record.
pub fn component_json(
    id: &str,
    group: Option<&str>,
    name: &str,
    version: Option<&str>,
    format: &str,
    assets: Vec<serde_json::Value>,
) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "group": group,
        "name": name,
        "version": version,
        "format": format,
        "repository": "test-repo",
        "assets": assets
    })
}

/// JSON for one listing page.
pub fn page_json(items: Vec<serde_json::Value>, token: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "items": items,
        "continuationToken": token
    })
}
