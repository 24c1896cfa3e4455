use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::cnp::Cnp;

#[derive(Subcommand)]
pub enum CnpCommands {
    #[command(about = "Validate a CNP and show the birth date, sex and age")]
    Inspect {
        #[arg(help = "13-digit CNP")]
        cnp: String,
        #[arg(long, help = "Reference date for the age (YYYY-MM-DD, defaults to today)")]
        on: Option<NaiveDate>,
    },
}

pub async fn handle(cmd: CnpCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CnpCommands::Inspect { cnp, on } => {
            let parsed = match Cnp::parse(&cnp) {
                Ok(parsed) => parsed,
                Err(e) => {
                    output_error(output_format, &e.to_string(), Some("CNP_INVALID"))?;
                    anyhow::bail!("invalid CNP");
                }
            };
            let reference = on.unwrap_or_else(|| Utc::now().date_naive());
            let age = parsed.age_on(reference);
            output_success(
                output_format,
                &format!("CNP {} is valid", parsed.as_str()),
                Some(json!({
                    "birthDate": parsed.birth_date().to_string(),
                    "sex": parsed.sex(),
                    "age": format!("{} years {} months", age.years, age.months),
                })),
            )
        }
    }
}
