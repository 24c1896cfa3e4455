use clap::Subcommand;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the document table and indexes in DATABASE_URL")]
    Migrate,

    #[command(about = "Check connectivity to DATABASE_URL")]
    Check,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let result = match cmd {
        DbCommands::Migrate => {
            DatabaseManager::migrate().await?;
            output_success(output_format, "Document schema is up to date", None)
        }
        DbCommands::Check => {
            DatabaseManager::health_check().await?;
            output_success(output_format, "Database is reachable", None)
        }
    };
    DatabaseManager::close().await;
    result
}
