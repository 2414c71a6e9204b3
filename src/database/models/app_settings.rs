use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Uuid),
    ColumnDef::new("screenshot_interval_minutes", ColumnType::Integer).default_sql("10"),
    ColumnDef::new("idle_threshold_minutes", ColumnType::Integer).default_sql("5"),
    ColumnDef::new("work_day_start", ColumnType::Time),
    ColumnDef::new("work_day_end", ColumnType::Time),
    ColumnDef::new("updated_at", ColumnType::Timestamp),
];

/// Id of the single settings row.
pub const SETTINGS_ID: Uuid = Uuid::from_u128(1);

/// Global monitoring settings, stored as a single row keyed by [`SETTINGS_ID`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "settings_id")]
    pub id: Uuid,
    pub screenshot_interval_minutes: i64,
    pub idle_threshold_minutes: i64,
    pub work_day_start: NaiveTime,
    pub work_day_end: NaiveTime,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn settings_id() -> Uuid {
    SETTINGS_ID
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            id: SETTINGS_ID,
            screenshot_interval_minutes: 10,
            idle_threshold_minutes: 5,
            work_day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            work_day_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            updated_at: Utc::now(),
        }
    }
}

impl EntityModel for AppSettings {
    const KIND: EntityKind = EntityKind::AppSettings;

    fn key(&self) -> KeyValue {
        KeyValue::Id(self.id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.into()),
            ("screenshot_interval_minutes", self.screenshot_interval_minutes.into()),
            ("idle_threshold_minutes", self.idle_threshold_minutes.into()),
            ("work_day_start", self.work_day_start.into()),
            ("work_day_end", self.work_day_end.into()),
            ("updated_at", self.updated_at.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.try_get("id")?,
            screenshot_interval_minutes: row.try_get("screenshot_interval_minutes")?,
            idle_threshold_minutes: row.try_get("idle_threshold_minutes")?,
            work_day_start: row.try_get("work_day_start")?,
            work_day_end: row.try_get("work_day_end")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
