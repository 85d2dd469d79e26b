use anyhow::Context;
use chatops_core::config::WarnLevel;
use chatops_core::RelayConfig;
use std::path::Path;

pub fn run(config_path: Option<&Path>, port: Option<u16>) -> anyhow::Result<()> {
    // Fails with every missing variable listed, before anything is bound.
    let mut config =
        RelayConfig::load(config_path).context("failed to load relay configuration")?;
    if let Some(port) = port {
        config.port = port;
    }

    let warnings = config.validate();
    for w in &warnings {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => tracing::error!("{}", w.message),
        }
    }
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("relay configuration has errors; run `chatops config check`");
    }

    for (key, value) in config.summary() {
        tracing::info!("{key}: {value}");
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(chatops_server::serve(config))
}
