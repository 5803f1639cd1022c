//! CLI command definitions and dispatch.

pub mod config;
pub mod listen;
pub mod migrate;

use clap::{Parser, Subcommand};

use gigboard_core::config::AppConfig;
use gigboard_core::error::AppError;

use crate::output::OutputFormat;

/// GigBoard: realtime marketplace notifications
#[derive(Debug, Parser)]
#[command(name = "gigboard", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment overlay (config/{env}.toml)
    #[arg(short, long, env = "GIGBOARD_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Connect to the notification channel and print what arrives
    Listen(listen::ListenArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Listen(args) => listen::execute(args, &self.env, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, &self.env).await,
            Commands::Config(args) => config::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}
