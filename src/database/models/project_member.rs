use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("user_id", ColumnType::Uuid),
    ColumnDef::new("project_id", ColumnType::Uuid),
    ColumnDef::new("member_role", ColumnType::Text).default_sql("'Member'"),
    ColumnDef::new("joined_at", ColumnType::Timestamp),
];

fn default_member_role() -> String {
    "Member".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user_id: Uuid,
    pub project_id: Uuid,
    #[serde(default = "default_member_role")]
    pub member_role: String,
    #[serde(default = "Utc::now")]
    pub joined_at: DateTime<Utc>,
}

impl ProjectMember {
    pub fn new(user_id: Uuid, project_id: Uuid) -> Self {
        Self {
            user_id,
            project_id,
            member_role: default_member_role(),
            joined_at: Utc::now(),
        }
    }
}

impl EntityModel for ProjectMember {
    const KIND: EntityKind = EntityKind::ProjectMember;

    fn key(&self) -> KeyValue {
        KeyValue::Pair(self.user_id, self.project_id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", self.user_id.into()),
            ("project_id", self.project_id.into()),
            ("member_role", self.member_role.clone().into()),
            ("joined_at", self.joined_at.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            project_id: row.try_get("project_id")?,
            member_role: row.try_get("member_role")?,
            joined_at: row.try_get("joined_at")?,
        })
    }
}
