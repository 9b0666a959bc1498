pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{Dashboard, Registry, Selection};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    /// Render the dashboard once
    Board { select: Option<String> },
    /// Render the dashboard and keep taking selections from stdin
    Watch { select: Option<String> },
}

/// Wires the providers configured in `config` into a dashboard over the
/// default instrument set.
pub fn build_dashboard(config: &AppConfig) -> Result<Dashboard> {
    let fred = providers::FredProvider::new(&config.providers.fred, &config.http)
        .context("Failed to create FRED client")?;
    let eodhd = providers::EodhdProvider::new(&config.providers.eodhd, &config.http)
        .context("Failed to create EODHD client")?;

    Ok(Dashboard::new(
        Registry::default(),
        Arc::new(fred),
        Arc::new(eodhd),
        config,
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Bond terminal starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        fred = %config.providers.fred.base_url,
        eodhd = %config.providers.eodhd.base_url,
        "Loaded config"
    );

    let dashboard = build_dashboard(&config)?;
    let mut selection = Selection::new(dashboard.registry());

    match command {
        AppCommand::Board { select } => {
            if let Some(name) = select {
                selection.select(&name)?;
            }
            cli::board::run(&dashboard, &selection).await
        }
        AppCommand::Watch { select } => {
            if let Some(name) = select {
                selection.select(&name)?;
            }
            cli::watch::run(&dashboard, &mut selection).await
        }
    }
}
