use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Uuid),
    ColumnDef::new("name", ColumnType::Text),
    ColumnDef::new("description", ColumnType::Text).nullable(),
    ColumnDef::new("status", ColumnType::Text).default_sql("'Active'"),
    ColumnDef::new("start_date", ColumnType::Date).nullable(),
    ColumnDef::new("end_date", ColumnType::Date).nullable(),
    ColumnDef::new("created_at", ColumnType::Timestamp),
];

fn default_status() -> String {
    "Active".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "super::new_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            status: default_status(),
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
        }
    }
}

impl EntityModel for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn key(&self) -> KeyValue {
        KeyValue::Id(self.id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.into()),
            ("name", self.name.clone().into()),
            ("description", self.description.clone().into()),
            ("status", self.status.clone().into()),
            ("start_date", self.start_date.into()),
            ("end_date", self.end_date.into()),
            ("created_at", self.created_at.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
