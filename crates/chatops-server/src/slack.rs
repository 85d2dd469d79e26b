//! Outbound Slack Web API calls. The relay only ever posts plain-text replies
//! into the channel a mention came from.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const POST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to reach Slack: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Slack returned HTTP {0}")]
    Status(u16),

    #[error("chat.postMessage failed: {0}")]
    Api(String),
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_url: String,
    bot_token: String,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    pub fn new(api_url: &str, bot_token: impl Into<String>) -> Result<Self, SlackError> {
        let http = reqwest::Client::builder()
            .timeout(POST_TIMEOUT)
            .build()
            .map_err(SlackError::Client)?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        })
    }

    /// `POST {api_url}/chat.postMessage`. Slack answers 200 even for most
    /// failures, so `ok: false` is checked as well as the status.
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        let resp = self
            .http
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.bot_token)
            .json(&PostMessage { channel, text })
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(SlackError::Status(resp.status().as_u16()));
        }
        let body: ApiResponse = resp.json().await?;
        if !body.ok {
            return Err(SlackError::Api(
                body.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        Ok(())
    }
}
