//! HTTP gateway for the Xata workspace API.
//!
//! Non-success statuses are decoded into [`Error`] with the server's own
//! message preserved, so callers can show it verbatim.

use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::types::{Workspace, WorkspaceMeta, WorkspaceSummary};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use ureq::Body;
use ureq::http::Response;

/// Default API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.xata.io";

const USER_AGENT: &str = concat!("xata-provider/", env!("CARGO_PKG_VERSION"));

/// Gateway backed by the Xata REST API.
///
/// # Example
///
/// ```no_run
/// use xata::gateway::Gateway;
/// use xata::gateway::http::HttpGateway;
///
/// let gateway = HttpGateway::new("xau_example".to_owned());
/// for workspace in gateway.list().unwrap() {
///     println!("{:?}", workspace.name);
/// }
/// ```
pub struct HttpGateway {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// API base URL.
    api_base: String,
    /// Bearer token.
    api_key: SecretString,
}

impl HttpGateway {
    /// Create a gateway against the default API endpoint.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self::with_api_base(DEFAULT_API_BASE, api_key)
    }

    /// Create a gateway against a custom endpoint (staging, tests).
    pub fn with_api_base(api_base: impl Into<String>, api_key: impl Into<SecretString>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn workspaces_url(&self) -> String {
        format!("{}/workspaces", self.api_base)
    }

    fn workspace_url(&self, id: &str) -> String {
        format!("{}/workspaces/{}", self.api_base, urlencoding::encode(id))
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }
}

impl fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpGateway")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

impl Gateway for HttpGateway {
    fn create(&self, payload: &WorkspaceMeta) -> Result<Workspace> {
        let url = self.workspaces_url();
        log::debug!("POST {url}");

        let response = self
            .agent
            .post(&url)
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send_json(payload)?;

        let mut response = check(response, "workspace")?;
        Ok(response.body_mut().read_json()?)
    }

    fn get(&self, id: &str) -> Result<Workspace> {
        let url = self.workspace_url(id);
        log::debug!("GET {url}");

        let response = self
            .agent
            .get(&url)
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .call()?;

        let mut response = check(response, &format!("workspace {id}"))?;
        Ok(response.body_mut().read_json()?)
    }

    fn update(&self, id: &str, payload: &WorkspaceMeta) -> Result<Workspace> {
        let url = self.workspace_url(id);
        log::debug!("PUT {url}");

        let response = self
            .agent
            .put(&url)
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send_json(payload)?;

        let mut response = check(response, &format!("workspace {id}"))?;
        Ok(response.body_mut().read_json()?)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let url = self.workspace_url(id);
        log::debug!("DELETE {url}");

        let response = self
            .agent
            .delete(&url)
            .header("Authorization", self.bearer())
            .header("User-Agent", USER_AGENT)
            .call()?;

        check(response, &format!("workspace {id}"))?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<WorkspaceSummary>> {
        let url = self.workspaces_url();
        log::debug!("GET {url}");

        let response = self
            .agent
            .get(&url)
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .call()?;

        let mut response = check(response, "workspaces")?;
        let list: WorkspaceList = response.body_mut().read_json()?;
        Ok(list.workspaces)
    }
}

/// Pass successful responses through; turn anything else into an [`Error`].
fn check(mut response: Response<Body>, resource: &str) -> Result<Response<Body>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.body_mut().read_to_string().unwrap_or_default();
    Err(Error::from_status(
        status.as_u16(),
        resource,
        error_message(&body, status.as_u16()),
    ))
}

/// Extract the `message` field of an API error body, falling back to the raw body.
fn error_message(body: &str, status: u16) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(ApiError {
            message: Some(message),
        }) => message,
        _ if body.trim().is_empty() => format!("HTTP {status}"),
        _ => body.trim().to_string(),
    }
}

// =============================================================================
// API response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct WorkspaceList {
    #[serde(default)]
    workspaces: Vec<WorkspaceSummary>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
}
