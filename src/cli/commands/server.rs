use clap::Subcommand;
use serde_json::Value;
use std::time::Duration;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Show server information from the API root endpoint")]
    Info {
        #[arg(long, env = "KINDER_API_URL", default_value = "http://localhost:3000", help = "Server base URL")]
        url: String,
    },

    #[command(about = "Check server health status from the /health endpoint")]
    Health {
        #[arg(long, env = "KINDER_API_URL", default_value = "http://localhost:3000", help = "Server base URL")]
        url: String,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
    match cmd {
        ServerCommands::Info { url } => {
            let body: Value = client.get(endpoint(&url, "/")).send().await?.json().await?;
            output_success(output_format, &format!("Server at {}", url), body.get("data").cloned())
        }
        ServerCommands::Health { url } => {
            let response = client.get(endpoint(&url, "/health")).send().await?;
            let status = response.status();
            let body: Value = response.json().await?;
            if status.is_success() {
                output_success(output_format, "Server is healthy", body.get("data").cloned())
            } else {
                output_error(output_format, &format!("Server reported {}", status), Some("SERVER_UNHEALTHY"))?;
                anyhow::bail!("server unhealthy")
            }
        }
    }
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
