use anyhow::Result;
use colored::Colorize;
use estimate_gate::{
    config::{self, Config},
    logging::Masked,
};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the current configuration with secrets masked
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    // Serialize to TOML format
    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Payment Verification: {}", payment_mode(&cfg));
    println!("  Metrics: {}", cfg.metrics.enabled);

    info!("Configuration validation successful");
    Ok(())
}

/// Mask the signing secret and provider token for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();

    for value in [&mut sanitized.token.secret, &mut sanitized.payment.access_token] {
        if let Some(secret) = value.as_mut() {
            *secret = Masked::new(secret).to_string();
        }
    }

    sanitized
}

fn payment_mode(cfg: &Config) -> &'static str {
    match (cfg.payment.access_token.is_some(), cfg.payment.dev_bypass) {
        (true, _) => "gumroad",
        (false, true) => "development bypass",
        (false, false) => "unavailable",
    }
}
