use crate::output::{print_json, print_table};
use anyhow::Context;
use chatops_core::config::WarnLevel;
use chatops_core::RelayConfig;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Load the settings, show them with secrets masked, and list warnings
    Check,
}

pub fn run(config_path: Option<&Path>, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Check => check(config_path, json),
    }
}

fn check(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config =
        RelayConfig::load(config_path).context("failed to load relay configuration")?;
    let warnings = config.validate();
    let summary = config.summary();

    if json {
        let settings: serde_json::Map<String, serde_json::Value> = summary
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
            .collect();
        print_json(&serde_json::json!({
            "settings": settings,
            "warnings": warnings,
        }))?;
    } else {
        let rows: Vec<Vec<String>> = summary
            .into_iter()
            .map(|(k, v)| vec![k.to_string(), v])
            .collect();
        print_table(&["SETTING", "VALUE"], &rows);
        println!();
        if warnings.is_empty() {
            println!("Config is valid. No warnings.");
        }
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
