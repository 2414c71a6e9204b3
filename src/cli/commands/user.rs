use clap::Subcommand;
use serde_json::json;

use crate::auth::{hash_password, Role};
use crate::cli::utils::{output_success, output_table};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::models::User;
use crate::database::{AppDbContext, Repository};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create the first Admin account if the email is not taken")]
    BootstrapAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, help = "At least 8 characters")]
        password: String,
    },

    #[command(about = "List user accounts")]
    List,
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = AppDbContext::connect(&config().database).await?;

    let result = match cmd {
        UserCommands::BootstrapAdmin { email, full_name, password } => {
            bootstrap_admin(&ctx, &email, &full_name, &password, output_format).await
        }
        UserCommands::List => {
            let mut users = ctx.users().all().await?;
            users.sort_by(|a, b| a.email.cmp(&b.email));
            let rows: Vec<Vec<String>> = users
                .iter()
                .map(|u| {
                    vec![
                        u.id.to_string(),
                        u.email.clone(),
                        u.role.to_string(),
                        u.is_active.to_string(),
                    ]
                })
                .collect();
            output_table(output_format, "users", &["id", "email", "role", "active"], &rows)
        }
    };

    ctx.close().await;
    result
}

async fn bootstrap_admin(
    ctx: &AppDbContext,
    email: &str,
    full_name: &str,
    password: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let email = email.trim().to_lowercase();
    if password.len() < 8 {
        anyhow::bail!("Password must be at least 8 characters");
    }
    if !ctx.users().find_by("email", email.clone()).await?.is_empty() {
        anyhow::bail!("User '{}' already exists", email);
    }

    let mut admin = User::new(full_name, email.clone(), Role::Admin);
    admin.password_hash = hash_password(password)?;
    let admin = Repository::<User>::new(ctx.clone()).create(admin).await?;

    output_success(
        output_format,
        &format!("Created admin '{}'", admin.email),
        Some(json!({ "id": admin.id, "email": admin.email })),
    )
}
