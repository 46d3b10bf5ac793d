//! Single-request execution with the accepted-status policy.
//!
//! Every repository operation funnels through [`NexusClient::execute`]: one
//! HTTP request, one normalized outcome. No retries happen here — a failure
//! is terminal for that call and is the caller's to handle.

use reqwest::{Method, multipart::Form};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::NexusClient;
use crate::error::{Error, Result};
use crate::types::Page;

/// Status codes treated as success for any repository call.
pub(crate) const ACCEPTED_STATUS: [u16; 4] = [200, 201, 204, 302];

/// Normalized result of one executed request.
#[derive(Debug)]
pub(crate) enum ExecOutcome {
    /// Parsed JSON body
    Json(serde_json::Value),
    /// Non-empty body that was not valid JSON
    Text(String),
    /// Redirect target from a 302 `Location` header
    Redirect(String),
    /// Success with no body expected
    NoContent,
}

/// One request to the repository service.
///
/// `path` is an operation path with its query string already attached;
/// paths beginning with `/service/rest` are used verbatim against the root
/// URL, anything else gets the `/service/rest/v1` prefix.
pub(crate) struct ApiRequest {
    pub path: String,
    pub method: Method,
    pub timeout: Option<Duration>,
    pub expect_json: bool,
    pub account: Option<String>,
    pub form: Option<Form>,
}

impl ApiRequest {
    /// A GET expecting a JSON body.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::GET,
            timeout: None,
            expect_json: true,
            account: None,
            form: None,
        }
    }

    /// A DELETE expecting no body.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::DELETE,
            timeout: None,
            expect_json: false,
            account: None,
            form: None,
        }
    }

    /// A multipart POST expecting no body.
    pub fn post_form(path: impl Into<String>, form: Form) -> Self {
        Self {
            path: path.into(),
            method: Method::POST,
            timeout: None,
            expect_json: false,
            account: None,
            form: Some(form),
        }
    }

    /// Override the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Stop expecting a JSON body (redirect and boolean-style calls).
    pub fn expect_json(mut self, expect_json: bool) -> Self {
        self.expect_json = expect_json;
        self
    }

    /// Sign with a named account instead of the configured default.
    #[allow(dead_code)]
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }
}

/// Percent-encode query pairs into a query string.
pub(crate) fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Deserialize a JSON outcome into a listing page.
pub(crate) fn json_page<T: DeserializeOwned>(outcome: ExecOutcome, path: &str) -> Result<Page<T>> {
    match outcome {
        ExecOutcome::Json(value) => Ok(serde_json::from_value(value)?),
        other => Err(Error::UnexpectedResponse {
            path: path.to_string(),
            reason: format!("expected a JSON listing, got {:?}", kind_of(&other)),
        }),
    }
}

/// Deserialize a JSON outcome into a single value.
pub(crate) fn json_value<T: DeserializeOwned>(outcome: ExecOutcome, path: &str) -> Result<T> {
    match outcome {
        ExecOutcome::Json(value) => Ok(serde_json::from_value(value)?),
        other => Err(Error::UnexpectedResponse {
            path: path.to_string(),
            reason: format!("expected a JSON body, got {:?}", kind_of(&other)),
        }),
    }
}

fn kind_of(outcome: &ExecOutcome) -> &'static str {
    match outcome {
        ExecOutcome::Json(_) => "json",
        ExecOutcome::Text(_) => "text",
        ExecOutcome::Redirect(_) => "redirect",
        ExecOutcome::NoContent => "no content",
    }
}

impl NexusClient {
    /// Absolute URL for an operation path.
    pub(crate) fn api_url(&self, path: &str) -> String {
        let root = self.config.root_url.trim_end_matches('/');
        if path.starts_with("/service/rest") {
            format!("{}{}", root, path)
        } else {
            format!("{}/service/rest/v1{}", root, path)
        }
    }

    /// Execute one request and normalize the response.
    ///
    /// Applies the accepted-status policy, then picks the richest outcome the
    /// response supports: parsed JSON, raw text when JSON was expected but
    /// malformed, the redirect target on a 302, or plain no-content success.
    pub(crate) async fn execute(&self, request: ApiRequest) -> Result<ExecOutcome> {
        let account = self.account(request.account.as_deref())?;
        let url = self.api_url(&request.path);
        let timeout = request
            .timeout
            .unwrap_or(self.config.http.request_timeout);

        tracing::debug!(method = %request.method, url = %url, "nexus api request");

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .basic_auth(&account.username, Some(&account.password))
            .timeout(timeout);
        if let Some(form) = request.form {
            builder = builder.multipart(form);
        }

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(status = %status, url = %url, "nexus api response");

        if !ACCEPTED_STATUS.contains(&status.as_u16()) {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, url = %url, "nexus api call failed");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| url.clone());
            return Ok(ExecOutcome::Redirect(location));
        }

        if request.expect_json {
            let text = response.text().await?;
            if !text.is_empty() {
                return match serde_json::from_str(&text) {
                    Ok(value) => Ok(ExecOutcome::Json(value)),
                    Err(_) => Ok(ExecOutcome::Text(text)),
                };
            }
        }

        Ok(ExecOutcome::NoContent)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::{basic_auth, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NexusClient {
        let config = Config::with_account(server.uri(), "admin", "admin", "admin123");
        NexusClient::new(config).unwrap()
    }

    #[test]
    fn api_url_prefixes_versioned_paths_only() {
        let config = Config::with_account("http://nexus.local:8081/", "admin", "admin", "admin123");
        let client = NexusClient::new(config).unwrap();

        assert_eq!(
            client.api_url("/components?repository=libs"),
            "http://nexus.local:8081/service/rest/v1/components?repository=libs"
        );
        assert_eq!(
            client.api_url("/service/rest/v1/status"),
            "http://nexus.local:8081/service/rest/v1/status"
        );
    }

    #[test]
    fn encode_query_escapes_reserved_characters() {
        let pairs = vec![
            ("repository".to_string(), "maven releases".to_string()),
            ("maven.extension".to_string(), "jar".to_string()),
        ];
        assert_eq!(
            encode_query(&pairs),
            "repository=maven%20releases&maven.extension=jar"
        );
    }

    #[tokio::test]
    async fn execute_parses_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/components"))
            .and(basic_auth("admin", "admin123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [],
                "continuationToken": null
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let outcome = client.execute(ApiRequest::get("/components")).await.unwrap();
        assert!(matches!(outcome, ExecOutcome::Json(_)));
    }

    #[tokio::test]
    async fn execute_falls_back_to_text_on_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK but not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let outcome = client.execute(ApiRequest::get("/status")).await.unwrap();
        match outcome {
            ExecOutcome::Text(text) => assert_eq!(text, "OK but not json"),
            other => panic!("expected Text, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn execute_rejects_status_outside_accepted_set() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/service/rest/v1/components/abc"))
            .respond_with(ResponseTemplate::new(404).set_body_string("component not found"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .execute(ApiRequest::delete("/components/abc"))
            .await
            .unwrap_err();
        match err {
            Error::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "component not found");
            }
            other => panic!("expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn execute_surfaces_redirect_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/search/assets/download"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "http://mirror.local/repo/app-1.0.jar"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let outcome = client
            .execute(ApiRequest::get("/search/assets/download").expect_json(false))
            .await
            .unwrap();
        match outcome {
            ExecOutcome::Redirect(location) => {
                assert_eq!(location, "http://mirror.local/repo/app-1.0.jar");
            }
            other => panic!("expected Redirect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn execute_returns_no_content_for_bodyless_success() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/service/rest/v1/components/abc"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let outcome = client
            .execute(ApiRequest::delete("/components/abc"))
            .await
            .unwrap();
        assert!(matches!(outcome, ExecOutcome::NoContent));
    }
}
