use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Uuid),
    ColumnDef::new("user_id", ColumnType::Uuid).nullable(),
    ColumnDef::new("leave_type", ColumnType::Text),
    ColumnDef::new("start_date", ColumnType::Date),
    ColumnDef::new("end_date", ColumnType::Date),
    ColumnDef::new("reason", ColumnType::Text).nullable(),
    ColumnDef::new("status", ColumnType::Text).default_sql("'Pending'"),
    ColumnDef::new("created_at", ColumnType::Timestamp),
];

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_APPROVED: &str = "Approved";
pub const STATUS_REJECTED: &str = "Rejected";

fn default_status() -> String {
    STATUS_PENDING.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    #[serde(default = "super::new_id")]
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    pub fn new(user_id: Option<Uuid>, leave_type: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            leave_type: leave_type.into(),
            start_date,
            end_date,
            reason: None,
            status: default_status(),
            created_at: Utc::now(),
        }
    }

    pub fn is_valid_status(status: &str) -> bool {
        matches!(status, STATUS_PENDING | STATUS_APPROVED | STATUS_REJECTED)
    }
}

impl EntityModel for LeaveRequest {
    const KIND: EntityKind = EntityKind::LeaveRequest;

    fn key(&self) -> KeyValue {
        KeyValue::Id(self.id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.into()),
            ("user_id", self.user_id.into()),
            ("leave_type", self.leave_type.clone().into()),
            ("start_date", self.start_date.into()),
            ("end_date", self.end_date.into()),
            ("reason", self.reason.clone().into()),
            ("status", self.status.clone().into()),
            ("created_at", self.created_at.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            leave_type: row.try_get("leave_type")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            reason: row.try_get("reason")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
