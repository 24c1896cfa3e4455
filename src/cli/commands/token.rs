use clap::Subcommand;
use serde_json::json;

use crate::auth::{generate_jwt, validate_jwt, Claims};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a bearer token with the configured JWT_SECRET")]
    Issue {
        #[arg(long, help = "Account uid (the token subject)")]
        uid: String,
        #[arg(long, help = "Account email")]
        email: String,
        #[arg(long, help = "Lifetime in hours (defaults to JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Verify a token and print its claims")]
    Verify {
        #[arg(help = "Bearer token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    match cmd {
        TokenCommands::Issue { uid, email, hours } => {
            let hours = hours.unwrap_or(security.jwt_expiry_hours);
            let claims = Claims::new(uid, email, hours);
            let token = generate_jwt(&claims, &security.jwt_secret)?;
            match output_format {
                OutputFormat::Text => println!("{}", token),
                OutputFormat::Json => output_success(
                    output_format,
                    "Token issued",
                    Some(json!({ "token": token, "sub": claims.sub, "exp": claims.exp })),
                )?,
            }
            Ok(())
        }
        TokenCommands::Verify { token } => match validate_jwt(&token, &security.jwt_secret) {
            Ok(claims) => output_success(
                output_format,
                "Token is valid",
                Some(json!({ "sub": claims.sub, "email": claims.email, "iat": claims.iat, "exp": claims.exp })),
            ),
            Err(e) => {
                output_error(output_format, &e.to_string(), Some("TOKEN_INVALID"))?;
                anyhow::bail!("token rejected")
            }
        },
    }
}
