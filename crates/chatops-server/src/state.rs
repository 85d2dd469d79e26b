use std::sync::Arc;

use chatops_core::{CommandRouter, RelayConfig, Verifier};
use github_client::GithubClient;

use crate::slack::SlackClient;

/// Shared application state passed to all route handlers. Everything in here
/// is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub verifier: Verifier,
    pub router: Arc<CommandRouter<GithubClient>>,
    pub slack: SlackClient,
}

impl AppState {
    /// Build the outbound clients from a validated config.
    pub fn new(config: RelayConfig) -> anyhow::Result<Self> {
        let github = GithubClient::with_base_url(&config.github.token, &config.github.api_url)?;
        let router = CommandRouter::new(github, &config.github.org, &config.github.default_ref);
        let slack = SlackClient::new(&config.slack.api_url, &config.slack.bot_token)?;

        if config.slack.skip_verification {
            tracing::warn!("Slack request verification is DISABLED; do not run this in production");
        }

        Ok(Self {
            verifier: config.verifier(),
            router: Arc::new(router),
            slack,
            config: Arc::new(config),
        })
    }
}
