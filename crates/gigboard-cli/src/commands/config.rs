//! Configuration commands.

use clap::{Args, Subcommand};

use gigboard_core::error::AppError;
use gigboard_database::connection::mask_password;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,
    /// Check that the configuration loads
    Validate,
}

/// Execute config commands
pub async fn execute(args: &ConfigArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let mut config = super::load_config(env)?;

    match &args.command {
        ConfigCommand::Show => {
            config.database.url = mask_password(&config.database.url);
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => {
            output::print_success(&format!("Configuration for '{env}' is valid"));
            println!("  Server: {}", config.server.bind_addr());
            println!("  Store: {:?}", config.store.provider);
            println!("  Database: {}", mask_password(&config.database.url));
            println!(
                "  Reconnect: base {}ms, max {}ms, {} attempts",
                config.client.base_delay_ms, config.client.max_delay_ms, config.client.max_attempts
            );
        }
    }

    Ok(())
}
