//! Chat text for every routing outcome. Kept apart from the router so the
//! routing decisions can be tested without matching on strings.

use crate::command::{MentionCommand, Verb};
use crate::router::{Reply, SlashReply};

pub const PROMPT: &str = "Please provide a command. Available commands: `deploy`, `build`, `test`";
pub const SLASH_UNKNOWN: &str = "Unknown command";
pub const SLASH_USAGE: &str = "Usage: `/devops-action <repository> <workflow> [parameters...]`";

pub const HELP: &str = concat!(
    "🤖 *GitHub Action Bot Commands*\n\n",
    "*Available Commands:*\n",
    "• `deploy <environment> <service>` - Deploy a service to an environment\n",
    "• `build <service>` - Build a service\n",
    "• `test <service>` - Run tests for a service\n",
    "• `help` - Show this help message\n\n",
    "*Slash Commands:*\n",
    "• `/devops-action <repository> <workflow> [parameters...]` - Trigger a specific GitHub Action\n\n",
    "*Examples:*\n",
    "• `@bot deploy staging user-service`\n",
    "• `@bot build payment-service`\n",
    "• `@bot test notification-service`\n",
    "• `/devops-action user-service deploy.yml environment staging`\n\n",
    "*Need help?* Contact the DevOps team! 🚀"
);

pub fn usage(verb: Verb) -> &'static str {
    match verb {
        Verb::Deploy => "Usage: `deploy <environment> <service>`",
        Verb::Build => "Usage: `build <service>`",
        Verb::Test => "Usage: `test <service>`",
        Verb::Help => HELP,
    }
}

impl Reply {
    pub fn render(&self) -> String {
        match self {
            Reply::Prompt => PROMPT.to_string(),
            Reply::Help => HELP.to_string(),
            Reply::UnknownCommand(verb) => {
                format!("Unknown command: {verb}. Type `help` for available commands.")
            }
            Reply::Usage(verb) => usage(*verb).to_string(),
            Reply::Dispatched(command) => match command {
                MentionCommand::Deploy {
                    environment,
                    service,
                } => format!(
                    "🚀 Deployment of `{service}` to `{environment}` environment has been triggered!"
                ),
                MentionCommand::Build { service } => {
                    format!("🔨 Build for `{service}` has been triggered!")
                }
                MentionCommand::Test { service } => {
                    format!("🧪 Tests for `{service}` have been triggered!")
                }
                MentionCommand::Help => HELP.to_string(),
            },
            Reply::DispatchFailed { command, error } => {
                let what = match command.verb() {
                    Verb::Deploy => "deployment",
                    Verb::Build => "build",
                    Verb::Test => "tests",
                    Verb::Help => "command",
                };
                format!("❌ Failed to trigger {what}: {error}")
            }
        }
    }
}

impl SlashReply {
    pub fn render(&self) -> String {
        match self {
            SlashReply::UnknownCommand => SLASH_UNKNOWN.to_string(),
            SlashReply::Usage => SLASH_USAGE.to_string(),
            SlashReply::Dispatched(command) => format!(
                "✅ GitHub Action `{}` triggered for repository `{}`",
                command.workflow, command.repository
            ),
            SlashReply::DispatchFailed { error, .. } => {
                format!("Failed to trigger GitHub Action: {error}")
            }
        }
    }
}
