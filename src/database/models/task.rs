use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Uuid),
    ColumnDef::new("title", ColumnType::Text),
    ColumnDef::new("description", ColumnType::Text).nullable(),
    ColumnDef::new("status", ColumnType::Text).default_sql("'Pending'"),
    ColumnDef::new("priority", ColumnType::Text).default_sql("'Medium'"),
    ColumnDef::new("due_date", ColumnType::Date).nullable(),
    ColumnDef::new("project_id", ColumnType::Uuid).nullable(),
    ColumnDef::new("assigned_to", ColumnType::Uuid).nullable(),
    ColumnDef::new("created_at", ColumnType::Timestamp),
];

fn default_status() -> String {
    "Pending".to_string()
}

fn default_priority() -> String {
    "Medium".to_string()
}

/// A unit of work, optionally filed under a project and optionally owned by
/// one user. Further assignees are attached through `user_tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default = "super::new_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, project_id: Option<Uuid>, assigned_to: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            status: default_status(),
            priority: default_priority(),
            due_date: None,
            project_id,
            assigned_to,
            created_at: Utc::now(),
        }
    }
}

impl EntityModel for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn key(&self) -> KeyValue {
        KeyValue::Id(self.id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.into()),
            ("title", self.title.clone().into()),
            ("description", self.description.clone().into()),
            ("status", self.status.clone().into()),
            ("priority", self.priority.clone().into()),
            ("due_date", self.due_date.into()),
            ("project_id", self.project_id.into()),
            ("assigned_to", self.assigned_to.into()),
            ("created_at", self.created_at.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            priority: row.try_get("priority")?,
            due_date: row.try_get("due_date")?,
            project_id: row.try_get("project_id")?,
            assigned_to: row.try_get("assigned_to")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
