use crate::output::{print_json, print_table};
use anyhow::Context;
use chatops_core::command::pair_inputs;
use chatops_core::config::{ConfigFile, GithubConfig};
use chatops_core::WorkflowDispatchRequest;
use clap::Subcommand;
use github_client::GithubClient;
use std::path::Path;

#[derive(Subcommand)]
pub enum WorkflowsSubcommand {
    /// List the Actions workflows defined in a repository
    List {
        repo: String,
        /// Organization (overrides GITHUB_ORG)
        #[arg(long)]
        org: Option<String>,
    },

    /// Trigger one workflow_dispatch run
    Dispatch {
        repo: String,
        /// Workflow file name or numeric ID, e.g. `deploy.yml`
        workflow: String,
        /// Workflow inputs as alternating `key value` tokens
        inputs: Vec<String>,
        /// Organization (overrides GITHUB_ORG)
        #[arg(long)]
        org: Option<String>,
        /// Git ref to run against (overrides GITHUB_REF)
        #[arg(long = "ref")]
        git_ref: Option<String>,
    },
}

pub fn run(
    config_path: Option<&Path>,
    subcmd: WorkflowsSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        WorkflowsSubcommand::List { repo, org } => {
            let github = github_config(config_path, org)?;
            list(&github, &repo, json)
        }
        WorkflowsSubcommand::Dispatch {
            repo,
            workflow,
            inputs,
            org,
            git_ref,
        } => {
            let github = github_config(config_path, org)?;
            if inputs.len() % 2 == 1 {
                tracing::warn!(
                    "ignoring unpaired trailing input '{}'",
                    inputs[inputs.len() - 1]
                );
            }
            let request = WorkflowDispatchRequest {
                organization: github.org.clone(),
                repository: repo,
                workflow_id: workflow,
                git_ref: git_ref.unwrap_or_else(|| github.default_ref.clone()),
                inputs: pair_inputs(&inputs),
            };
            dispatch(&github, &request, json)
        }
    }
}

/// GitHub settings only; the Slack half may be absent when driving the API
/// by hand.
fn github_config(config_path: Option<&Path>, org: Option<String>) -> anyhow::Result<GithubConfig> {
    let mut file =
        ConfigFile::load_with_env(config_path).context("failed to load relay configuration")?;
    if org.is_some() {
        file.github.org = org;
    }
    GithubConfig::from_file(&file).context("failed to load GitHub configuration")
}

fn client(github: &GithubConfig) -> anyhow::Result<GithubClient> {
    Ok(GithubClient::with_base_url(&github.token, &github.api_url)?)
}

fn list(github: &GithubConfig, repo: &str, json: bool) -> anyhow::Result<()> {
    let client = client(github)?;
    let rt = tokio::runtime::Runtime::new()?;
    let list = rt
        .block_on(client.list_workflows(&github.org, repo))
        .with_context(|| format!("{}/{repo}", github.org))?;

    if json {
        return print_json(&list);
    }

    if list.workflows.is_empty() {
        println!("No workflows in {}/{repo}.", github.org);
        return Ok(());
    }
    let rows: Vec<Vec<String>> = list
        .workflows
        .iter()
        .map(|w| {
            vec![
                w.id.to_string(),
                w.name.clone(),
                w.path.clone(),
                w.state.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "PATH", "STATE"], &rows);
    println!("\n{} workflow(s)", list.total_count);
    Ok(())
}

fn dispatch(
    github: &GithubConfig,
    request: &WorkflowDispatchRequest,
    json: bool,
) -> anyhow::Result<()> {
    let client = client(github)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(client.trigger_workflow(request))
        .with_context(|| {
            format!(
                "{} on {}/{}",
                request.workflow_id, request.organization, request.repository
            )
        })?;

    if json {
        print_json(&serde_json::json!({
            "dispatched": true,
            "request": request,
        }))
    } else {
        println!(
            "Triggered {} on {}/{} at {}",
            request.workflow_id, request.organization, request.repository, request.git_ref
        );
        Ok(())
    }
}
