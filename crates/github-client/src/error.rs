use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid API URL '{0}'")]
    InvalidUrl(String),

    /// Connection failures and timeouts alike.
    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("workflow dispatch failed: {message}")]
    Api {
        status: u16,
        message: String,
        documentation_url: Option<String>,
    },

    #[error("workflow dispatch failed with status {0}")]
    DispatchStatus(u16),

    #[error("failed to list workflows: status {0}")]
    ListStatus(u16),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl GithubError {
    /// HTTP status returned by GitHub, when the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            GithubError::Api { status, .. } => Some(*status),
            GithubError::DispatchStatus(s) | GithubError::ListStatus(s) => Some(*s),
            _ => None,
        }
    }
}
