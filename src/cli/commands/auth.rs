use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{hash_password, JwtService, Role};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Issue a signed bearer token without a login round trip")]
    Token {
        #[arg(long, help = "User id placed in the sub claim")]
        user_id: Uuid,
        #[arg(long, help = "Email claim")]
        email: String,
        #[arg(long, default_value = "Employee", help = "Admin, TeamLead or Employee")]
        role: Role,
    },

    #[command(about = "Hash a password in the stored PHC format")]
    HashPassword {
        #[arg(help = "Plain text password")]
        password: String,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Token { user_id, email, role } => {
            let jwt = JwtService::new(&config().jwt)?;
            let token = jwt.issue(user_id, &email, role)?;
            match output_format {
                OutputFormat::Text => println!("{}", token),
                OutputFormat::Json => output_success(
                    output_format,
                    "Token issued",
                    Some(json!({ "token": token, "expires_in": jwt.expires_in_secs(), "role": role })),
                )?,
            }
            Ok(())
        }
        AuthCommands::HashPassword { password } => {
            let hash = hash_password(&password)?;
            match output_format {
                OutputFormat::Text => println!("{}", hash),
                OutputFormat::Json => output_success(output_format, "Password hashed", Some(json!({ "hash": hash })))?,
            }
            Ok(())
        }
    }
}
