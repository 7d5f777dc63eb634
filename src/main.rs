use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use estimate_gate::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();

    // Initialize tracing/logging before anything else can log
    init_tracing(args.log_format);

    // Dispatch to appropriate command handler
    match args.get_command() {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Estimate(estimate_args) => {
            commands::estimate::execute(&estimate_args)?;
        }
        cli::Commands::Version => {
            println!("Estimate Gate v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
