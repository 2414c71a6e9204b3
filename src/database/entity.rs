use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use std::fmt;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models;

/// Every persisted record type, listed principals first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    User,
    Branch,
    Project,
    Task,
    UserTask,
    ProjectMember,
    Screenshot,
    ActivityLog,
    LeaveRequest,
    Notification,
    AppSettings,
    Holiday,
}

impl EntityKind {
    pub const ALL: [EntityKind; 12] = [
        EntityKind::User,
        EntityKind::Branch,
        EntityKind::Project,
        EntityKind::Task,
        EntityKind::UserTask,
        EntityKind::ProjectMember,
        EntityKind::Screenshot,
        EntityKind::ActivityLog,
        EntityKind::LeaveRequest,
        EntityKind::Notification,
        EntityKind::AppSettings,
        EntityKind::Holiday,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Branch => "branches",
            EntityKind::Project => "projects",
            EntityKind::Task => "tasks",
            EntityKind::UserTask => "user_tasks",
            EntityKind::ProjectMember => "project_members",
            EntityKind::Screenshot => "screenshots",
            EntityKind::ActivityLog => "activity_logs",
            EntityKind::LeaveRequest => "leave_requests",
            EntityKind::Notification => "notifications",
            EntityKind::AppSettings => "app_settings",
            EntityKind::Holiday => "holidays",
        }
    }

    pub fn columns(self) -> &'static [ColumnDef] {
        match self {
            EntityKind::User => models::user::COLUMNS,
            EntityKind::Branch => models::branch::COLUMNS,
            EntityKind::Project => models::project::COLUMNS,
            EntityKind::Task => models::task::COLUMNS,
            EntityKind::UserTask => models::user_task::COLUMNS,
            EntityKind::ProjectMember => models::project_member::COLUMNS,
            EntityKind::Screenshot => models::screenshot::COLUMNS,
            EntityKind::ActivityLog => models::activity_log::COLUMNS,
            EntityKind::LeaveRequest => models::leave_request::COLUMNS,
            EntityKind::Notification => models::notification::COLUMNS,
            EntityKind::AppSettings => models::app_settings::COLUMNS,
            EntityKind::Holiday => models::holiday::COLUMNS,
        }
    }

    pub fn column(self, name: &str) -> Option<&'static ColumnDef> {
        self.columns().iter().find(|c| c.name == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
    Integer,
    Boolean,
    Date,
    Time,
    Timestamp,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Uuid => "BLOB",
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Time => "TIME",
            ColumnType::Timestamp => "DATETIME",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<&'static str>,
}

impl ColumnDef {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            unique: false,
            default: None,
        }
    }

    pub const fn nullable(self) -> Self {
        Self { nullable: true, ..self }
    }

    pub const fn unique(self) -> Self {
        Self { unique: true, ..self }
    }

    pub const fn default_sql(self, expr: &'static str) -> Self {
        Self {
            default: Some(expr),
            ..self
        }
    }
}

/// A column value on its way into a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Uuid(Option<Uuid>),
    Text(Option<String>),
    Integer(Option<i64>),
    Boolean(bool),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
    Timestamp(Option<DateTime<Utc>>),
}

impl SqlValue {
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            SqlValue::Uuid(id) => *id,
            _ => None,
        }
    }
}

impl From<Uuid> for SqlValue {
    fn from(id: Uuid) -> Self {
        SqlValue::Uuid(Some(id))
    }
}

impl From<Option<Uuid>> for SqlValue {
    fn from(id: Option<Uuid>) -> Self {
        SqlValue::Uuid(id)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(Some(s.to_string()))
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(Some(s))
    }
}

impl From<Option<String>> for SqlValue {
    fn from(s: Option<String>) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Integer(Some(n))
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Boolean(b)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(d: NaiveDate) -> Self {
        SqlValue::Date(Some(d))
    }
}

impl From<Option<NaiveDate>> for SqlValue {
    fn from(d: Option<NaiveDate>) -> Self {
        SqlValue::Date(d)
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(t: NaiveTime) -> Self {
        SqlValue::Time(Some(t))
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(ts: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(Some(ts))
    }
}

impl From<Option<DateTime<Utc>>> for SqlValue {
    fn from(ts: Option<DateTime<Utc>>) -> Self {
        SqlValue::Timestamp(ts)
    }
}

pub type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

pub fn bind_value(q: SqliteQuery<'_>, value: SqlValue) -> SqliteQuery<'_> {
    match value {
        SqlValue::Uuid(v) => q.bind(v),
        SqlValue::Text(v) => q.bind(v),
        SqlValue::Integer(v) => q.bind(v),
        SqlValue::Boolean(v) => q.bind(v),
        SqlValue::Date(v) => q.bind(v),
        SqlValue::Time(v) => q.bind(v),
        SqlValue::Timestamp(v) => q.bind(v),
    }
}

/// Primary key of a row: a surrogate id, or a (user, other) pair for link tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Id(Uuid),
    Pair(Uuid, Uuid),
}

impl KeyValue {
    pub fn values(self) -> Vec<Uuid> {
        match self {
            KeyValue::Id(id) => vec![id],
            KeyValue::Pair(a, b) => vec![a, b],
        }
    }
}

impl From<Uuid> for KeyValue {
    fn from(id: Uuid) -> Self {
        KeyValue::Id(id)
    }
}

impl From<(Uuid, Uuid)> for KeyValue {
    fn from((a, b): (Uuid, Uuid)) -> Self {
        KeyValue::Pair(a, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub value: KeyValue,
}

impl EntityKey {
    pub fn new(kind: EntityKind, value: impl Into<KeyValue>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn of<T: EntityModel>(value: impl Into<KeyValue>) -> Self {
        Self::new(T::KIND, value)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            KeyValue::Id(id) => write!(f, "{}({})", self.kind, id),
            KeyValue::Pair(a, b) => write!(f, "{}({}, {})", self.kind, a, b),
        }
    }
}

/// A typed record stored in one table.
///
/// `values` must list every column in `KIND.columns()`, key columns included.
pub trait EntityModel: Serialize + DeserializeOwned + Send + Sync + Unpin + fmt::Debug + 'static {
    const KIND: EntityKind;

    fn key(&self) -> KeyValue;

    fn values(&self) -> Vec<(&'static str, SqlValue)>;

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError>;
}

/// Object-safe view of an [`EntityModel`], used to queue heterogeneous writes
/// in a unit of work.
pub trait Persist: Send + Sync + fmt::Debug {
    fn entity_kind(&self) -> EntityKind;
    fn entity_key(&self) -> EntityKey;
    fn column_values(&self) -> Vec<(&'static str, SqlValue)>;
}

impl<T: EntityModel> Persist for T {
    fn entity_kind(&self) -> EntityKind {
        T::KIND
    }

    fn entity_key(&self) -> EntityKey {
        EntityKey::new(T::KIND, self.key())
    }

    fn column_values(&self) -> Vec<(&'static str, SqlValue)> {
        self.values()
    }
}
