//! DDL derived from the relationship model.

use sqlx::SqlitePool;
use tracing::info;

use crate::database::entity::EntityKind;
use crate::database::manager::DatabaseError;
use crate::database::relationships::Model;

/// `CREATE TABLE` for one entity: columns, primary key and the foreign-key
/// clauses the model resolved for it.
pub fn create_table_sql(model: &Model, kind: EntityKind) -> String {
    let key = model.key_columns(kind);
    let single_key = key.len() == 1;
    let mut lines = Vec::new();

    for column in kind.columns() {
        let mut line = format!("    {} {}", column.name, column.ty.sql_type());
        if !column.nullable {
            line.push_str(" NOT NULL");
        }
        if single_key && key[0] == column.name {
            line.push_str(" PRIMARY KEY");
        } else if column.unique {
            line.push_str(" UNIQUE");
        }
        if let Some(default) = column.default {
            line.push_str(" DEFAULT ");
            line.push_str(default);
        }
        lines.push(line);
    }

    if key.len() > 1 {
        lines.push(format!("    PRIMARY KEY ({})", key.join(", ")));
    }

    for rel in model.references_from(kind) {
        lines.push(format!(
            "    CONSTRAINT fk_{table}_{fk} FOREIGN KEY ({fk}) REFERENCES {principal} ({pk}) ON DELETE {action}",
            table = kind.table_name(),
            fk = rel.foreign_key,
            principal = rel.principal.table_name(),
            pk = model.key_columns(rel.principal).join(", "),
            action = rel.on_delete.sql(),
        ));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        kind.table_name(),
        lines.join(",\n")
    )
}

/// Every statement needed to build the schema, principals before dependents.
pub fn schema_statements(model: &Model) -> Vec<String> {
    let mut statements: Vec<String> = EntityKind::ALL
        .iter()
        .map(|kind| create_table_sql(model, *kind))
        .collect();

    for rel in model.relationships() {
        // the leading key column is already indexed by the primary key
        if model.key_columns(rel.dependent).first() == Some(&rel.foreign_key) {
            continue;
        }
        statements.push(format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_{fk} ON {table} ({fk})",
            table = rel.dependent.table_name(),
            fk = rel.foreign_key,
        ));
    }

    statements
}

/// Apply the schema in a single transaction. Safe to run against an existing
/// database.
pub async fn apply(pool: &SqlitePool, model: &Model) -> Result<(), DatabaseError> {
    let statements = schema_statements(model);
    let mut tx = pool.begin().await?;
    for sql in &statements {
        sqlx::query(sql).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    info!(
        "Schema applied: {} tables, {} relationships",
        EntityKind::ALL.len(),
        model.relationships().len()
    );
    Ok(())
}
