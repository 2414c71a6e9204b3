use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Uuid),
    ColumnDef::new("name", ColumnType::Text),
    ColumnDef::new("date", ColumnType::Date).unique(),
    ColumnDef::new("is_recurring", ColumnType::Boolean).default_sql("0"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(default = "super::new_id")]
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_recurring: bool,
}

impl Holiday {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            is_recurring: false,
        }
    }
}

impl EntityModel for Holiday {
    const KIND: EntityKind = EntityKind::Holiday;

    fn key(&self) -> KeyValue {
        KeyValue::Id(self.id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.into()),
            ("name", self.name.clone().into()),
            ("date", self.date.into()),
            ("is_recurring", self.is_recurring.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            date: row.try_get("date")?,
            is_recurring: row.try_get("is_recurring")?,
        })
    }
}
