mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, workflows::WorkflowsSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "chatops",
    about = "Relay Slack commands to GitHub Actions workflow dispatches",
    version,
    propagate_version = true
)]
struct Cli {
    /// YAML settings file; environment variables override its values
    #[arg(long, global = true, env = "CHATOPS_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP relay until SIGINT or SIGTERM
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Inspect the relay configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// List or trigger GitHub Actions workflows directly
    Workflows {
        #[command(subcommand)]
        subcommand: WorkflowsSubcommand,
    },

    /// Show what a chat mention would do, without calling GitHub
    Route {
        /// Treat the text as `/devops-action` arguments instead of a mention
        #[arg(long)]
        slash: bool,

        /// Command text, e.g. `deploy staging user-service`
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Serve { port } => cmd::serve::run(config, port),
        Commands::Config { subcommand } => cmd::config::run(config, subcommand, cli.json),
        Commands::Workflows { subcommand } => cmd::workflows::run(config, subcommand, cli.json),
        Commands::Route { slash, text } => cmd::route::run(config, &text.join(" "), slash, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
