use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Uuid),
    ColumnDef::new("user_id", ColumnType::Uuid).nullable(),
    ColumnDef::new("activity_type", ColumnType::Text),
    ColumnDef::new("description", ColumnType::Text).nullable(),
    ColumnDef::new("application", ColumnType::Text).nullable(),
    ColumnDef::new("started_at", ColumnType::Timestamp),
    ColumnDef::new("ended_at", ColumnType::Timestamp).nullable(),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    #[serde(default = "super::new_id")]
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub activity_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub application: Option<String>,
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl ActivityLog {
    pub fn new(user_id: Option<Uuid>, activity_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            activity_type: activity_type.into(),
            description: None,
            application: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }
}

impl EntityModel for ActivityLog {
    const KIND: EntityKind = EntityKind::ActivityLog;

    fn key(&self) -> KeyValue {
        KeyValue::Id(self.id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.into()),
            ("user_id", self.user_id.into()),
            ("activity_type", self.activity_type.clone().into()),
            ("description", self.description.clone().into()),
            ("application", self.application.clone().into()),
            ("started_at", self.started_at.into()),
            ("ended_at", self.ended_at.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            activity_type: row.try_get("activity_type")?,
            description: row.try_get("description")?,
            application: row.try_get("application")?,
            started_at: row.try_get("started_at")?,
            ended_at: row.try_get("ended_at")?,
        })
    }
}
