//! Database migration commands.

use clap::{Args, Subcommand};

use gigboard_core::config::StoreProvider;
use gigboard_core::error::AppError;
use gigboard_database::connection::{DatabasePool, mask_password};
use gigboard_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    if config.store.provider != StoreProvider::Postgres {
        output::print_error("store.provider is not postgres; migrating the configured database anyway");
    }

    match &args.command {
        MigrateCommand::Run => {
            println!(
                "Running migrations against {}...",
                mask_password(&config.database.url)
            );
            let pool = DatabasePool::connect(&config.database).await?;
            let result = run_migrations(pool.pool()).await;
            pool.close().await;
            result?;
            output::print_success("All migrations applied successfully.");
        }
    }

    Ok(())
}
