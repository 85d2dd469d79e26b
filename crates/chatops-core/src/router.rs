use crate::command::{
    ActionCommand, InboundCommand, MentionCommand, Rejection, Verb, WorkflowDispatchRequest,
    SLASH_COMMAND,
};
use async_trait::async_trait;

/// Outbound seam: something that can trigger a workflow run exactly once.
#[async_trait]
pub trait WorkflowDispatcher: Send + Sync {
    type Error: std::fmt::Display + Send;

    async fn dispatch(&self, request: &WorkflowDispatchRequest) -> Result<(), Self::Error>;
}

/// Outcome of a mention-style command. Rendered to chat text by
/// [`Reply::render`](crate::message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Prompt,
    Help,
    UnknownCommand(String),
    Usage(Verb),
    Dispatched(MentionCommand),
    DispatchFailed {
        command: MentionCommand,
        error: String,
    },
}

impl From<Rejection> for Reply {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Empty => Reply::Prompt,
            Rejection::UnknownVerb(verb) => Reply::UnknownCommand(verb),
            Rejection::Usage(verb) => Reply::Usage(verb),
        }
    }
}

/// Outcome of a `/devops-action` slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashReply {
    UnknownCommand,
    Usage,
    Dispatched(ActionCommand),
    DispatchFailed {
        command: ActionCommand,
        error: String,
    },
}

/// Turns chat commands into at most one workflow dispatch each.
#[derive(Debug, Clone)]
pub struct CommandRouter<D> {
    dispatcher: D,
    org: String,
    git_ref: String,
}

impl<D: WorkflowDispatcher> CommandRouter<D> {
    pub fn new(dispatcher: D, org: impl Into<String>, git_ref: impl Into<String>) -> Self {
        Self {
            dispatcher,
            org: org.into(),
            git_ref: git_ref.into(),
        }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub async fn handle_mention(&self, inbound: &InboundCommand) -> Reply {
        let command = match MentionCommand::parse(&inbound.raw_text) {
            Ok(command) => command,
            Err(rejection) => return rejection.into(),
        };

        let Some(request) = command.to_dispatch(&self.org, &self.git_ref) else {
            return Reply::Help;
        };

        match self.send(&request, inbound).await {
            Ok(()) => Reply::Dispatched(command),
            Err(error) => Reply::DispatchFailed { command, error },
        }
    }

    pub async fn handle_slash(&self, command_name: &str, inbound: &InboundCommand) -> SlashReply {
        if command_name != SLASH_COMMAND {
            return SlashReply::UnknownCommand;
        }
        let Some(command) = ActionCommand::parse(&inbound.raw_text) else {
            return SlashReply::Usage;
        };

        let request = command.to_dispatch(&self.org, &self.git_ref);
        match self.send(&request, inbound).await {
            Ok(()) => SlashReply::Dispatched(command),
            Err(error) => SlashReply::DispatchFailed { command, error },
        }
    }

    async fn send(
        &self,
        request: &WorkflowDispatchRequest,
        inbound: &InboundCommand,
    ) -> Result<(), String> {
        tracing::info!(
            org = %request.organization,
            repo = %request.repository,
            workflow = %request.workflow_id,
            user = %inbound.source_user_id,
            channel = %inbound.source_channel_id,
            "dispatching workflow"
        );
        self.dispatcher.dispatch(request).await.map_err(|e| {
            let error = e.to_string();
            tracing::warn!(
                repo = %request.repository,
                workflow = %request.workflow_id,
                %error,
                "workflow dispatch failed"
            );
            error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<WorkflowDispatchRequest>>,
        fail_with: Option<String>,
    }

    impl Recorder {
        fn failing(msg: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_with: Some(msg.to_string()),
            }
        }

        fn sent(&self) -> Vec<WorkflowDispatchRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WorkflowDispatcher for Recorder {
        type Error = String;

        async fn dispatch(&self, request: &WorkflowDispatchRequest) -> Result<(), String> {
            self.sent.lock().unwrap().push(request.clone());
            match &self.fail_with {
                Some(msg) => Err(msg.clone()),
                None => Ok(()),
            }
        }
    }

    fn router(rec: Recorder) -> CommandRouter<Recorder> {
        CommandRouter::new(rec, "testorg", "main")
    }

    fn mention(text: &str) -> InboundCommand {
        InboundCommand::mention(text, "U1", "C1")
    }

    fn slash(text: &str) -> InboundCommand {
        InboundCommand::slash(text, "U1", "C1")
    }

    #[tokio::test]
    async fn empty_mention_prompts_without_dispatch() {
        let r = router(Recorder::default());
        assert_eq!(r.handle_mention(&mention("")).await, Reply::Prompt);
        assert!(r.dispatcher().sent().is_empty());
    }

    #[tokio::test]
    async fn usage_errors_never_dispatch() {
        let r = router(Recorder::default());
        for (text, verb) in [
            ("deploy", Verb::Deploy),
            ("deploy staging", Verb::Deploy),
            ("build", Verb::Build),
            ("test", Verb::Test),
        ] {
            assert_eq!(r.handle_mention(&mention(text)).await, Reply::Usage(verb));
        }
        assert!(r.dispatcher().sent().is_empty());
    }

    #[tokio::test]
    async fn unknown_and_help_never_dispatch() {
        let r = router(Recorder::default());
        assert_eq!(
            r.handle_mention(&mention("Deploy staging svc")).await,
            Reply::UnknownCommand("Deploy".into())
        );
        assert_eq!(r.handle_mention(&mention("help")).await, Reply::Help);
        assert!(r.dispatcher().sent().is_empty());
    }

    #[tokio::test]
    async fn deploy_dispatches_once() {
        let r = router(Recorder::default());
        let reply = r
            .handle_mention(&mention("deploy staging user-service"))
            .await;
        assert!(matches!(reply, Reply::Dispatched(MentionCommand::Deploy { .. })));

        let sent = r.dispatcher().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].workflow_id, "deploy.yml");
        assert_eq!(sent[0].git_ref, "main");
        assert_eq!(sent[0].repository, "user-service");
        assert_eq!(
            sent[0].inputs,
            BTreeMap::from([
                ("environment".to_string(), "staging".to_string()),
                ("service".to_string(), "user-service".to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn failed_dispatch_carries_error_text() {
        let r = router(Recorder::failing("workflow dispatch failed: Not Found"));
        let reply = r.handle_mention(&mention("build payment-service")).await;
        assert_eq!(
            reply,
            Reply::DispatchFailed {
                command: MentionCommand::Build {
                    service: "payment-service".into()
                },
                error: "workflow dispatch failed: Not Found".into(),
            }
        );
        assert_eq!(r.dispatcher().sent().len(), 1);
    }

    #[tokio::test]
    async fn unknown_slash_command_is_rejected() {
        let r = router(Recorder::default());
        assert_eq!(
            r.handle_slash("/unknown", &slash("repo wf.yml")).await,
            SlashReply::UnknownCommand
        );
        assert!(r.dispatcher().sent().is_empty());
    }

    #[tokio::test]
    async fn slash_usage_without_repo_and_workflow() {
        let r = router(Recorder::default());
        assert_eq!(
            r.handle_slash(SLASH_COMMAND, &slash("")).await,
            SlashReply::Usage
        );
        assert_eq!(
            r.handle_slash(SLASH_COMMAND, &slash("repo")).await,
            SlashReply::Usage
        );
        assert!(r.dispatcher().sent().is_empty());
    }

    #[tokio::test]
    async fn slash_dispatch_pairs_inputs_and_drops_extra() {
        let r = router(Recorder::default());
        r.handle_slash(SLASH_COMMAND, &slash("myrepo build.yml key1 val1 extra"))
            .await;
        let sent = r.dispatcher().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].repository, "myrepo");
        assert_eq!(sent[0].workflow_id, "build.yml");
        assert_eq!(
            sent[0].inputs,
            BTreeMap::from([("key1".to_string(), "val1".to_string())])
        );
    }
}
