use crate::output::print_json;
use anyhow::Context;
use chatops_core::command::{strip_mention, ActionCommand, MentionCommand};
use chatops_core::config::{ConfigFile, DEFAULT_REF};
use chatops_core::{Reply, SlashReply, WorkflowDispatchRequest};
use std::path::Path;

/// Placeholder shown when no organization is configured.
const UNSET_ORG: &str = "<GITHUB_ORG>";

/// Dry run of the chat router: parse, then print the reply and the dispatch
/// that would be sent. Never touches the network.
pub fn run(config_path: Option<&Path>, text: &str, slash: bool, json: bool) -> anyhow::Result<()> {
    let file = ConfigFile::load_with_env(config_path).context("failed to load relay configuration")?;
    let org = file.github.org.as_deref().unwrap_or(UNSET_ORG);
    let git_ref = file.github.default_ref.as_deref().unwrap_or(DEFAULT_REF);

    let (request, reply) = if slash {
        match ActionCommand::parse(text) {
            Some(command) => (
                Some(command.to_dispatch(org, git_ref)),
                SlashReply::Dispatched(command).render(),
            ),
            None => (None, SlashReply::Usage.render()),
        }
    } else {
        match MentionCommand::parse(strip_mention(text)) {
            Ok(command) => {
                let request = command.to_dispatch(org, git_ref);
                let reply = match request {
                    Some(_) => Reply::Dispatched(command),
                    None => Reply::Help,
                };
                (request, reply.render())
            }
            Err(rejection) => (None, Reply::from(rejection).render()),
        }
    };

    if json {
        return print_json(&serde_json::json!({
            "text": text,
            "dispatch": request,
            "reply": reply,
        }));
    }

    match &request {
        Some(request) => print_dispatch(request),
        None => println!("No workflow would be dispatched."),
    }
    println!("\nReply:\n{reply}");
    Ok(())
}

fn print_dispatch(request: &WorkflowDispatchRequest) {
    println!(
        "Would dispatch {} on {}/{} at {}",
        request.workflow_id, request.organization, request.repository, request.git_ref
    );
    for (key, value) in &request.inputs {
        println!("  {key} = {value}");
    }
}
