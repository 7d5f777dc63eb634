use clap::{Args, Parser, Subcommand};
use estimate_gate::LogFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gateway", version, about = "Construction cost estimate gateway")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", env = "ESTIMATE_GATE_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the gateway server (default)
    Start,

    /// Test configuration file validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Compute an estimate locally
    Estimate(EstimateArgs),

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration (with secrets masked)
    Show,

    /// Validate configuration file
    Validate,
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    /// Built-up area in square feet
    #[arg(long)]
    pub area: f64,

    /// basic, standard or premium
    #[arg(long, default_value = "standard")]
    pub specification: String,

    /// low, medium or high
    #[arg(long, default_value = "medium")]
    pub location: String,

    /// g0, g1 or g2
    #[arg(long, default_value = "g0")]
    pub floors: String,

    /// Also print the paid-tier range, breakdown and timeline
    #[arg(long)]
    pub detailed: bool,
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}
