use anyhow::Result;
use colored::Colorize;
use estimate_gate::{config, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Loads and validates configuration, then serves until a shutdown signal.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting gateway in foreground mode...".green());

    let cfg = config::load_config(config_path)?;
    info!(config = %config_path.display(), "Starting estimate gateway");

    // Blocks until shutdown
    server::start_server(cfg).await?;

    Ok(())
}
