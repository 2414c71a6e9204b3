use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Uuid),
    ColumnDef::new("name", ColumnType::Text),
    ColumnDef::new("location", ColumnType::Text).nullable(),
    ColumnDef::new("head_user_id", ColumnType::Uuid).nullable(),
];

/// An office or site. `head_user_id` names the user leading it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default = "super::new_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub head_user_id: Option<Uuid>,
}

impl Branch {
    pub fn new(name: impl Into<String>, head_user_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            location: None,
            head_user_id,
        }
    }
}

impl EntityModel for Branch {
    const KIND: EntityKind = EntityKind::Branch;

    fn key(&self) -> KeyValue {
        KeyValue::Id(self.id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.into()),
            ("name", self.name.clone().into()),
            ("location", self.location.clone().into()),
            ("head_user_id", self.head_user_id.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            head_user_id: row.try_get("head_user_id")?,
        })
    }
}
