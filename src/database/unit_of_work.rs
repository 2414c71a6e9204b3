use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use crate::database::context::AppDbContext;
use crate::database::entity::{bind_value, EntityKey, EntityModel, Persist};
use crate::database::integrity;
use crate::database::manager::DatabaseError;
use crate::database::relationships::Model;
use crate::types::ChangeKind;

/// A pending write.
#[derive(Debug)]
pub enum Change {
    Insert(Box<dyn Persist>),
    Update(Box<dyn Persist>),
    Delete(EntityKey),
}

impl Change {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Insert(_) => ChangeKind::Insert,
            Change::Update(_) => ChangeKind::Update,
            Change::Delete(_) => ChangeKind::Delete,
        }
    }

    pub fn key(&self) -> EntityKey {
        match self {
            Change::Insert(record) | Change::Update(record) => record.entity_key(),
            Change::Delete(key) => *key,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl CommitSummary {
    fn record(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Insert => self.inserted += 1,
            ChangeKind::Update => self.updated += 1,
            ChangeKind::Delete => self.deleted += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }
}

/// An ordered batch of changes applied together or not at all.
///
/// Nothing touches the database until [`UnitOfWork::commit`]. Changes run in
/// the order they were queued, inside one transaction, so a later change sees
/// the effects of earlier ones.
#[derive(Debug, Default)]
pub struct UnitOfWork {
    changes: Vec<Change>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<T: EntityModel>(&mut self, record: T) -> &mut Self {
        self.changes.push(Change::Insert(Box::new(record)));
        self
    }

    pub fn update<T: EntityModel>(&mut self, record: T) -> &mut Self {
        self.changes.push(Change::Update(Box::new(record)));
        self
    }

    pub fn remove(&mut self, key: EntityKey) -> &mut Self {
        self.changes.push(Change::Delete(key));
        self
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub async fn commit(self, ctx: &AppDbContext) -> Result<CommitSummary, DatabaseError> {
        let mut summary = CommitSummary::default();
        if self.changes.is_empty() {
            return Ok(summary);
        }

        let mut tx = ctx.pool().begin().await.map_err(DatabaseError::commit_failure)?;

        for change in &self.changes {
            if let Err(err) = apply(&mut *tx, ctx.model(), change).await {
                let err = match err {
                    DatabaseError::Sqlx(e) => DatabaseError::commit_failure(e),
                    other => other,
                };
                match &err {
                    DatabaseError::ConstraintViolation { constraint, .. } => {
                        warn!("Commit rejected by {} on {} {}", constraint, change.kind(), change.key());
                    }
                    other => warn!("Commit failed on {} {}: {}", change.kind(), change.key(), other),
                }
                if let Err(rollback) = tx.rollback().await {
                    warn!("Rollback failed: {}", rollback);
                }
                return Err(err);
            }
            summary.record(change.kind());
        }

        tx.commit().await.map_err(DatabaseError::from_write)?;

        debug!(
            "Committed {} change(s): {} inserted, {} updated, {} deleted",
            summary.total(),
            summary.inserted,
            summary.updated,
            summary.deleted
        );
        Ok(summary)
    }
}

async fn apply(conn: &mut SqliteConnection, model: &Model, change: &Change) -> Result<(), DatabaseError> {
    match change {
        Change::Insert(record) => {
            integrity::check_references(conn, model, record.as_ref()).await?;
            insert(conn, record.as_ref()).await
        }
        Change::Update(record) => {
            integrity::check_references(conn, model, record.as_ref()).await?;
            update(conn, model, record.as_ref()).await
        }
        Change::Delete(key) => {
            integrity::check_delete(conn, model, key).await?;
            delete(conn, model, key).await
        }
    }
}

async fn insert(conn: &mut SqliteConnection, record: &dyn Persist) -> Result<(), DatabaseError> {
    let values = record.column_values();
    let columns: Vec<&str> = values.iter().map(|(name, _)| *name).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        record.entity_kind().table_name(),
        columns.join(", "),
        vec!["?"; columns.len()].join(", ")
    );

    let mut query = sqlx::query(&sql);
    for (_, value) in values {
        query = bind_value(query, value);
    }
    query.execute(&mut *conn).await.map_err(DatabaseError::from_write)?;
    Ok(())
}

async fn update(conn: &mut SqliteConnection, model: &Model, record: &dyn Persist) -> Result<(), DatabaseError> {
    let key = record.entity_key();
    let key_columns = model.key_columns(key.kind);
    let values: Vec<_> = record
        .column_values()
        .into_iter()
        .filter(|(name, _)| !key_columns.contains(name))
        .collect();

    let assignments: Vec<String> = values.iter().map(|(name, _)| format!("{name} = ?")).collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        key.kind.table_name(),
        assignments.join(", "),
        key_predicate(key_columns)
    );

    let mut query = sqlx::query(&sql);
    for (_, value) in values {
        query = bind_value(query, value);
    }
    for id in key.value.values() {
        query = query.bind(id);
    }

    let result = query.execute(&mut *conn).await.map_err(DatabaseError::from_write)?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(key.to_string()));
    }
    Ok(())
}

async fn delete(conn: &mut SqliteConnection, model: &Model, key: &EntityKey) -> Result<(), DatabaseError> {
    let sql = format!(
        "DELETE FROM {} WHERE {}",
        key.kind.table_name(),
        key_predicate(model.key_columns(key.kind))
    );

    let mut query = sqlx::query(&sql);
    for id in key.value.values() {
        query = query.bind(id);
    }

    let result = query.execute(&mut *conn).await.map_err(DatabaseError::from_write)?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(key.to_string()));
    }
    Ok(())
}

pub(crate) fn key_predicate(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ")
}
