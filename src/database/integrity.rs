//! Integrity checks run inside a commit, before each write reaches the engine.
//!
//! The engine enforces the same foreign keys; these checks exist so a failure
//! names the relationship that caused it.

use sqlx::SqliteConnection;
use std::collections::{HashSet, VecDeque};
use tracing::debug;
use uuid::Uuid;

use crate::database::entity::{EntityKey, EntityKind, KeyValue, Persist};
use crate::database::manager::DatabaseError;
use crate::database::relationships::{DeleteBehavior, Model};

/// Walk the cascade graph below `key` and fail on the first relationship that
/// would block the delete.
///
/// `Restrict` and `NoAction` edges with live dependents both block. `Cascade`
/// edges are followed into the dependent rows so that restrictions further
/// down the graph are found too.
pub async fn check_delete(
    conn: &mut SqliteConnection,
    model: &Model,
    key: &EntityKey,
) -> Result<(), DatabaseError> {
    let root = match key.value {
        KeyValue::Id(id) => id,
        // composite keys are never referenced
        KeyValue::Pair(..) => return Ok(()),
    };

    let mut queue: VecDeque<(EntityKind, Uuid)> = VecDeque::from([(key.kind, root)]);
    let mut visited: HashSet<(EntityKind, Uuid)> = HashSet::new();

    while let Some((kind, id)) = queue.pop_front() {
        if !visited.insert((kind, id)) {
            continue;
        }

        for rel in model.dependents_of(kind) {
            let count: i64 = sqlx::query_scalar(&format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?",
                rel.dependent.table_name(),
                rel.foreign_key
            ))
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

            if count == 0 {
                continue;
            }

            match rel.on_delete {
                DeleteBehavior::Restrict | DeleteBehavior::NoAction => {
                    return Err(DatabaseError::constraint(
                        rel.name.clone(),
                        format!(
                            "cannot delete {key}: {count} {} row(s) still reference {kind}({id})",
                            rel.dependent
                        ),
                    ));
                }
                DeleteBehavior::Cascade => {
                    if model.dependents_of(rel.dependent).next().is_none() {
                        continue;
                    }
                    let pk = model.key_columns(rel.dependent)[0];
                    let ids: Vec<Uuid> = sqlx::query_scalar(&format!(
                        "SELECT {} FROM {} WHERE {} = ?",
                        pk,
                        rel.dependent.table_name(),
                        rel.foreign_key
                    ))
                    .bind(id)
                    .fetch_all(&mut *conn)
                    .await?;
                    debug!("{} cascades into {} {} row(s)", rel.name, ids.len(), rel.dependent);
                    queue.extend(ids.into_iter().map(|dep| (rel.dependent, dep)));
                }
            }
        }
    }

    Ok(())
}

/// Every non-null foreign key on `record` must point at an existing row.
pub async fn check_references(
    conn: &mut SqliteConnection,
    model: &Model,
    record: &dyn Persist,
) -> Result<(), DatabaseError> {
    let kind = record.entity_kind();
    let values = record.column_values();

    for rel in model.references_from(kind) {
        let target = values
            .iter()
            .find(|(name, _)| *name == rel.foreign_key)
            .and_then(|(_, value)| value.as_uuid());
        let Some(target) = target else {
            continue;
        };

        let pk = model.key_columns(rel.principal)[0];
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            rel.principal.table_name(),
            pk
        ))
        .bind(target)
        .fetch_one(&mut *conn)
        .await?;

        if count == 0 {
            return Err(DatabaseError::constraint(
                rel.name.clone(),
                format!(
                    "{} references missing {}({})",
                    record.entity_key(),
                    rel.principal,
                    target
                ),
            ));
        }
    }

    Ok(())
}
