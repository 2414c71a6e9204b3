use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Uuid),
    ColumnDef::new("user_id", ColumnType::Uuid).nullable(),
    ColumnDef::new("file_path", ColumnType::Text),
    ColumnDef::new("checksum", ColumnType::Text),
    ColumnDef::new("size_bytes", ColumnType::Integer),
    ColumnDef::new("captured_at", ColumnType::Timestamp),
];

/// Metadata for a stored screenshot. The image itself lives on disk under the
/// upload directory; `file_path` is relative to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    #[serde(default = "super::new_id")]
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub file_path: String,
    /// Hex SHA-256 of the stored bytes.
    pub checksum: String,
    pub size_bytes: i64,
    #[serde(default = "Utc::now")]
    pub captured_at: DateTime<Utc>,
}

impl Screenshot {
    pub fn new(user_id: Option<Uuid>, file_path: impl Into<String>, checksum: impl Into<String>, size_bytes: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            file_path: file_path.into(),
            checksum: checksum.into(),
            size_bytes,
            captured_at: Utc::now(),
        }
    }
}

impl EntityModel for Screenshot {
    const KIND: EntityKind = EntityKind::Screenshot;

    fn key(&self) -> KeyValue {
        KeyValue::Id(self.id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.into()),
            ("user_id", self.user_id.into()),
            ("file_path", self.file_path.clone().into()),
            ("checksum", self.checksum.clone().into()),
            ("size_bytes", self.size_bytes.into()),
            ("captured_at", self.captured_at.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            file_path: row.try_get("file_path")?,
            checksum: row.try_get("checksum")?,
            size_bytes: row.try_get("size_bytes")?,
            captured_at: row.try_get("captured_at")?,
        })
    }
}
