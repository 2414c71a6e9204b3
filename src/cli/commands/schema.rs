use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_success, output_table};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::schema::schema_statements;
use crate::database::{AppDbContext, Model};

#[derive(Subcommand)]
pub enum SchemaCommands {
    #[command(about = "Print the CREATE TABLE and index statements")]
    Sql,

    #[command(about = "List resolved relationships and their delete behavior")]
    Relationships,

    #[command(about = "Create missing tables in the configured database")]
    Apply,
}

pub async fn handle(cmd: SchemaCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let model = Model::standard()?;

    match cmd {
        SchemaCommands::Sql => {
            let statements = schema_statements(&model);
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "statements": statements }))?),
                OutputFormat::Text => {
                    for statement in statements {
                        println!("{};\n", statement);
                    }
                }
            }
            Ok(())
        }
        SchemaCommands::Relationships => {
            let rows: Vec<Vec<String>> = model
                .relationships()
                .iter()
                .map(|r| {
                    vec![
                        r.name.clone(),
                        format!("{:?}", r.multiplicity),
                        if r.required { "required" } else { "optional" }.to_string(),
                        format!("{:?}", r.on_delete),
                    ]
                })
                .collect();
            output_table(
                output_format,
                "relationships",
                &["name", "multiplicity", "required", "on_delete"],
                &rows,
            )
        }
        SchemaCommands::Apply => {
            let settings = &config().database;
            // Connecting applies the schema.
            let ctx = AppDbContext::connect(settings).await?;
            ctx.close().await;
            output_success(
                output_format,
                &format!("Schema applied to {}", settings.url),
                Some(json!({ "database": settings.url })),
            )
        }
    }
}
