use std::time::Duration;

use async_trait::async_trait;
use chatops_core::{WorkflowDispatchRequest, WorkflowDispatcher};
use reqwest::{header, Method, RequestBuilder, StatusCode};
use url::Url;

use crate::types::{ApiErrorBody, WorkflowList};
use crate::{GithubError, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const ACCEPT: &str = "application/vnd.github.v3+json";
pub const USER_AGENT: &str = concat!("chatops-relay/", env!("CARGO_PKG_VERSION"));

/// Every call is bounded by this; a timeout surfaces as [`GithubError::Transport`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ─── GithubClient ─────────────────────────────────────────────────────────

/// Token-authenticated client for the GitHub Actions endpoints the relay
/// uses. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    /// Point the client at another API root, e.g. GitHub Enterprise's
    /// `https://ghe.example.com/api/v3`.
    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|_| GithubError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(GithubError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(GithubError::Client)?;
        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    /// `POST /repos/{org}/{repo}/actions/workflows/{id}/dispatches`.
    ///
    /// Only `204 No Content` counts as success. The call is made once and
    /// never retried.
    pub async fn trigger_workflow(&self, request: &WorkflowDispatchRequest) -> Result<()> {
        let url = self.endpoint(&[
            "repos",
            &request.organization,
            &request.repository,
            "actions",
            "workflows",
            &request.workflow_id,
            "dispatches",
        ])?;

        let resp = self
            .request(Method::POST, url)
            .json(&request.payload())
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            tracing::debug!(
                repo = %request.repository,
                workflow = %request.workflow_id,
                "workflow dispatch accepted"
            );
            return Ok(());
        }

        match resp.json::<ApiErrorBody>().await {
            Ok(body) => Err(GithubError::Api {
                status: status.as_u16(),
                message: body.message,
                documentation_url: body.documentation_url,
            }),
            Err(_) => Err(GithubError::DispatchStatus(status.as_u16())),
        }
    }

    /// `GET /repos/{org}/{repo}/actions/workflows`. Requires exactly `200 OK`.
    pub async fn list_workflows(&self, org: &str, repo: &str) -> Result<WorkflowList> {
        let url = self.endpoint(&["repos", org, repo, "actions", "workflows"])?;
        let resp = self.request(Method::GET, url).send().await?;

        if resp.status() != StatusCode::OK {
            return Err(GithubError::ListStatus(resp.status().as_u16()));
        }
        resp.json::<WorkflowList>()
            .await
            .map_err(|e| GithubError::Decode(e.to_string()))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, ACCEPT)
    }

    /// Append path segments to the base URL, percent-encoding each one so
    /// chat-supplied names cannot escape their segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GithubError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl WorkflowDispatcher for GithubClient {
    type Error = GithubError;

    async fn dispatch(&self, request: &WorkflowDispatchRequest) -> Result<()> {
        self.trigger_workflow(request).await
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
