use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("required environment variables are missing: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("invalid value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("request verification failed: {0}")]
    Verification(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RelayError {
    pub fn verification(msg: impl Into<String>) -> Self {
        Self::Verification(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
