use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("user_id", ColumnType::Uuid),
    ColumnDef::new("task_id", ColumnType::Uuid),
    ColumnDef::new("assigned_at", ColumnType::Timestamp),
];

/// Link row assigning a task to a user. Keyed by `(user_id, task_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTask {
    pub user_id: Uuid,
    pub task_id: Uuid,
    #[serde(default = "Utc::now")]
    pub assigned_at: DateTime<Utc>,
}

impl UserTask {
    pub fn new(user_id: Uuid, task_id: Uuid) -> Self {
        Self {
            user_id,
            task_id,
            assigned_at: Utc::now(),
        }
    }
}

impl EntityModel for UserTask {
    const KIND: EntityKind = EntityKind::UserTask;

    fn key(&self) -> KeyValue {
        KeyValue::Pair(self.user_id, self.task_id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", self.user_id.into()),
            ("task_id", self.task_id.into()),
            ("assigned_at", self.assigned_at.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            task_id: row.try_get("task_id")?,
            assigned_at: row.try_get("assigned_at")?,
        })
    }
}
