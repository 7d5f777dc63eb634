use anyhow::Result;
use colored::Colorize;
use estimate_gate::{config, logging::mask_option};
use std::path::Path;
use tracing::info;

/// Execute the test command
///
/// This validates the configuration file without starting the server
pub fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Testing configuration...".yellow());
    info!("Loading and validating configuration");

    // Load configuration (this will validate it)
    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration test successful".green());
    println!();

    println!("{}", "Configuration Summary:".bold());
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!("  {}: {}", "CORS Origin".cyan(), cfg.server.cors_allowed_origin);
    println!(
        "  {}: {}",
        "Signing Secret".cyan(),
        mask_option(cfg.token.secret.as_deref())
    );
    println!();

    println!("{}", "Payment Provider:".cyan());
    println!(
        "    Gumroad: {}",
        if cfg.payment.access_token.is_some() {
            "enabled".green()
        } else {
            "disabled".red()
        }
    );
    println!(
        "    Access Token: {}",
        mask_option(cfg.payment.access_token.as_deref())
    );
    println!("    Base URL: {}", cfg.payment.base_url);
    println!("    Timeout: {}s", cfg.payment.timeout_seconds);
    if let Some(product_id) = &cfg.payment.product_id {
        println!("    Product: {}", product_id);
    }
    if cfg.payment.access_token.is_none() {
        println!(
            "    Dev Bypass: {}",
            if cfg.payment.dev_bypass {
                "ENABLED".yellow()
            } else {
                "disabled".normal()
            }
        );
    }
    println!();

    println!(
        "  {}: {}",
        "Metrics".cyan(),
        if cfg.metrics.enabled {
            "enabled".green()
        } else {
            "disabled".red()
        }
    );

    info!("Configuration test completed successfully");
    Ok(())
}
