use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The only slash command the relay answers to.
pub const SLASH_COMMAND: &str = "/devops-action";

// ---------------------------------------------------------------------------
// Inbound side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStyle {
    Mention,
    SlashCommand,
}

/// One chat request, built per HTTP call and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub raw_text: String,
    pub source_user_id: String,
    pub source_channel_id: String,
    pub style: InvocationStyle,
}

impl InboundCommand {
    pub fn mention(
        text: impl Into<String>,
        user: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            raw_text: text.into(),
            source_user_id: user.into(),
            source_channel_id: channel.into(),
            style: InvocationStyle::Mention,
        }
    }

    pub fn slash(
        text: impl Into<String>,
        user: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            raw_text: text.into(),
            source_user_id: user.into(),
            source_channel_id: channel.into(),
            style: InvocationStyle::SlashCommand,
        }
    }
}

/// Remove a leading `<@U123>` bot mention from app-mention text.
pub fn strip_mention(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("<@") {
        if let Some(end) = rest.find('>') {
            return rest[end + 1..].trim();
        }
    }
    trimmed
}

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Deploy,
    Build,
    Test,
    Help,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Deploy => "deploy",
            Verb::Build => "build",
            Verb::Test => "test",
            Verb::Help => "help",
        }
    }

    /// Workflow file triggered by this verb, if it triggers one.
    pub fn workflow_file(&self) -> Option<&'static str> {
        match self {
            Verb::Deploy => Some("deploy.yml"),
            Verb::Build => Some("build.yml"),
            Verb::Test => Some("test.yml"),
            Verb::Help => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deploy" => Ok(Verb::Deploy),
            "build" => Ok(Verb::Build),
            "test" => Ok(Verb::Test),
            "help" => Ok(Verb::Help),
            other => Err(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsed commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionCommand {
    Deploy { environment: String, service: String },
    Build { service: String },
    Test { service: String },
    Help,
}

/// Why mention text did not produce a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    UnknownVerb(String),
    Usage(Verb),
}

impl MentionCommand {
    pub fn parse(text: &str) -> Result<Self, Rejection> {
        let mut tokens = text.split_whitespace();
        let first = tokens.next().ok_or(Rejection::Empty)?;
        let verb: Verb = first.parse().map_err(Rejection::UnknownVerb)?;
        let args: Vec<&str> = tokens.collect();

        match verb {
            Verb::Deploy => match args.as_slice() {
                [environment, service, ..] => Ok(MentionCommand::Deploy {
                    environment: environment.to_string(),
                    service: service.to_string(),
                }),
                _ => Err(Rejection::Usage(verb)),
            },
            Verb::Build => match args.first() {
                Some(service) => Ok(MentionCommand::Build {
                    service: service.to_string(),
                }),
                None => Err(Rejection::Usage(verb)),
            },
            Verb::Test => match args.first() {
                Some(service) => Ok(MentionCommand::Test {
                    service: service.to_string(),
                }),
                None => Err(Rejection::Usage(verb)),
            },
            Verb::Help => Ok(MentionCommand::Help),
        }
    }

    pub fn verb(&self) -> Verb {
        match self {
            MentionCommand::Deploy { .. } => Verb::Deploy,
            MentionCommand::Build { .. } => Verb::Build,
            MentionCommand::Test { .. } => Verb::Test,
            MentionCommand::Help => Verb::Help,
        }
    }

    /// The dispatch this command triggers. `Help` triggers none.
    pub fn to_dispatch(&self, org: &str, git_ref: &str) -> Option<WorkflowDispatchRequest> {
        let workflow = self.verb().workflow_file()?;
        let (service, inputs) = match self {
            MentionCommand::Deploy {
                environment,
                service,
            } => (
                service,
                BTreeMap::from([
                    ("environment".to_string(), environment.clone()),
                    ("service".to_string(), service.clone()),
                ]),
            ),
            MentionCommand::Build { service } | MentionCommand::Test { service } => (
                service,
                BTreeMap::from([("service".to_string(), service.clone())]),
            ),
            MentionCommand::Help => return None,
        };
        Some(WorkflowDispatchRequest {
            organization: org.to_string(),
            repository: service.clone(),
            workflow_id: workflow.to_string(),
            git_ref: git_ref.to_string(),
            inputs,
        })
    }
}

/// Arguments of `/devops-action <repository> <workflow> [key value]...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCommand {
    pub repository: String,
    pub workflow: String,
    pub inputs: BTreeMap<String, String>,
}

impl ActionCommand {
    /// `None` when fewer than two tokens are present.
    pub fn parse(text: &str) -> Option<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [repository, workflow, rest @ ..] = tokens.as_slice() else {
            return None;
        };
        Some(Self {
            repository: repository.to_string(),
            workflow: workflow.to_string(),
            inputs: pair_inputs(rest),
        })
    }

    pub fn to_dispatch(&self, org: &str, git_ref: &str) -> WorkflowDispatchRequest {
        WorkflowDispatchRequest {
            organization: org.to_string(),
            repository: self.repository.clone(),
            workflow_id: self.workflow.clone(),
            git_ref: git_ref.to_string(),
            inputs: self.inputs.clone(),
        }
    }
}

/// Consume tokens as `(key, value)` pairs. A trailing key without a value is
/// dropped.
pub fn pair_inputs<S: AsRef<str>>(tokens: &[S]) -> BTreeMap<String, String> {
    tokens
        .chunks_exact(2)
        .map(|pair| (pair[0].as_ref().to_string(), pair[1].as_ref().to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Outbound side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDispatchRequest {
    pub organization: String,
    pub repository: String,
    pub workflow_id: String,
    pub git_ref: String,
    pub inputs: BTreeMap<String, String>,
}

impl WorkflowDispatchRequest {
    /// The JSON body GitHub expects: `{"ref": ..., "inputs": {...}}`.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({
            "ref": self.git_ref,
            "inputs": self.inputs,
        })
    }
}
