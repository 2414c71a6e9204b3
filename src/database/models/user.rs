use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::auth::policy::Role;
use crate::database::codec::{self, DecodeError, SkillMap};
use crate::database::entity::{ColumnDef, ColumnType, EntityKind, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Uuid),
    ColumnDef::new("full_name", ColumnType::Text),
    ColumnDef::new("email", ColumnType::Text).unique(),
    ColumnDef::new("password_hash", ColumnType::Text),
    ColumnDef::new("role", ColumnType::Text).default_sql("'Employee'"),
    ColumnDef::new("department", ColumnType::Text).nullable(),
    ColumnDef::new("technical_skills", ColumnType::Text).default_sql("'{}'"),
    ColumnDef::new("is_active", ColumnType::Boolean).default_sql("1"),
    ColumnDef::new("created_at", ColumnType::Timestamp),
];

/// An employee account. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default = "super::new_id")]
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub technical_skills: SkillMap,
    #[serde(default = "super::default_true")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            email: email.into(),
            password_hash: String::new(),
            role,
            department: None,
            technical_skills: SkillMap::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

impl EntityModel for User {
    const KIND: EntityKind = EntityKind::User;

    fn key(&self) -> KeyValue {
        KeyValue::Id(self.id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.into()),
            ("full_name", self.full_name.clone().into()),
            ("email", self.email.clone().into()),
            ("password_hash", self.password_hash.clone().into()),
            ("role", self.role.as_str().into()),
            ("department", self.department.clone().into()),
            ("technical_skills", codec::encode(&self.technical_skills).into()),
            ("is_active", self.is_active.into()),
            ("created_at", self.created_at.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        let role: String = row.try_get("role")?;
        let role = role
            .parse::<Role>()
            .map_err(|e| DecodeError::new("role", e.to_string()))?;
        let skills: Option<String> = row.try_get("technical_skills")?;

        Ok(Self {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role,
            department: row.try_get("department")?,
            technical_skills: codec::decode(skills.as_deref())?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_not_serialized() {
        let mut user = User::new("Ada Lovelace", "ada@example.com", Role::Admin);
        user.password_hash = "$argon2id$secret".to_string();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "Admin");
    }

    #[test]
    fn deserialize_fills_defaults() {
        let user: User = serde_json::from_value(serde_json::json!({
            "full_name": "Grace Hopper",
            "email": "grace@example.com",
            "technical_skills": { "cobol": "expert" }
        }))
        .unwrap();
        assert_eq!(user.role, Role::Employee);
        assert!(user.is_active);
        assert_eq!(user.technical_skills["cobol"], "expert");
    }

    #[test]
    fn values_cover_every_column() {
        let user = User::new("A", "a@example.com", Role::Employee);
        let names: Vec<_> = user.values().into_iter().map(|(n, _)| n).collect();
        let columns: Vec<_> = COLUMNS.iter().map(|c| c.name).collect();
        assert_eq!(names, columns);
    }
}
