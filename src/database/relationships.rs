//! Relationship declarations between entities and the resolved model built
//! from them once at startup.
//!
//! Declarations are consumed in order. When the same foreign key is declared
//! more than once, the last declaration wins; the relationship keeps the slot
//! of its first declaration so the resolved order stays stable.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::database::entity::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Multiplicity {
    /// One principal row owns many dependent rows.
    OneToMany,
    /// One side of a many-to-many link table.
    ManyToManyLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeleteBehavior {
    /// Remove dependents together with the principal.
    Cascade,
    /// Reject deleting the principal while dependents exist.
    Restrict,
    /// No action of its own; the engine still rejects dangling references.
    NoAction,
}

impl DeleteBehavior {
    pub fn sql(self) -> &'static str {
        match self {
            DeleteBehavior::Cascade => "CASCADE",
            DeleteBehavior::Restrict => "RESTRICT",
            DeleteBehavior::NoAction => "NO ACTION",
        }
    }
}

/// One relationship as written in the declaration list. Unset fields are
/// resolved by convention when the model is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDecl {
    pub dependent: EntityKind,
    pub foreign_key: &'static str,
    pub principal: EntityKind,
    pub multiplicity: Multiplicity,
    pub required: Option<bool>,
    pub on_delete: Option<DeleteBehavior>,
}

impl RelationshipDecl {
    pub fn new(dependent: EntityKind, foreign_key: &'static str, principal: EntityKind) -> Self {
        Self {
            dependent,
            foreign_key,
            principal,
            multiplicity: Multiplicity::OneToMany,
            required: None,
            on_delete: None,
        }
    }

    pub fn link(mut self) -> Self {
        self.multiplicity = Multiplicity::ManyToManyLink;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }

    pub fn on_delete(mut self, behavior: DeleteBehavior) -> Self {
        self.on_delete = Some(behavior);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Key {
        entity: EntityKind,
        columns: &'static [&'static str],
    },
    Relationship(RelationshipDecl),
}

/// Declarations for the employee-monitoring schema, in declaration order.
///
/// `user_tasks.user_id` is declared twice: first without a delete policy, then
/// as `Restrict`. The second declaration is the one enforced.
pub fn declarations() -> Vec<Declaration> {
    use DeleteBehavior::{Cascade, Restrict};
    use EntityKind::*;

    vec![
        Declaration::Relationship(
            RelationshipDecl::new(Branch, "head_user_id", User).on_delete(Restrict),
        ),
        Declaration::Relationship(
            RelationshipDecl::new(Task, "project_id", Project)
                .on_delete(Cascade)
                .optional(),
        ),
        Declaration::Relationship(
            RelationshipDecl::new(Task, "assigned_to", User)
                .on_delete(Cascade)
                .optional(),
        ),
        Declaration::Relationship(
            RelationshipDecl::new(Screenshot, "user_id", User)
                .on_delete(Cascade)
                .optional(),
        ),
        Declaration::Relationship(
            RelationshipDecl::new(ActivityLog, "user_id", User)
                .on_delete(Cascade)
                .optional(),
        ),
        Declaration::Relationship(
            RelationshipDecl::new(LeaveRequest, "user_id", User)
                .on_delete(Cascade)
                .optional(),
        ),
        Declaration::Relationship(
            RelationshipDecl::new(Notification, "user_id", User)
                .on_delete(Cascade)
                .optional(),
        ),
        Declaration::Key {
            entity: UserTask,
            columns: &["user_id", "task_id"],
        },
        Declaration::Relationship(RelationshipDecl::new(UserTask, "user_id", User).link()),
        Declaration::Relationship(RelationshipDecl::new(UserTask, "task_id", Task).link()),
        Declaration::Key {
            entity: ProjectMember,
            columns: &["user_id", "project_id"],
        },
        Declaration::Relationship(RelationshipDecl::new(ProjectMember, "user_id", User).link()),
        Declaration::Relationship(
            RelationshipDecl::new(ProjectMember, "project_id", Project).link(),
        ),
        Declaration::Key {
            entity: UserTask,
            columns: &["user_id", "task_id"],
        },
        Declaration::Relationship(
            RelationshipDecl::new(UserTask, "user_id", User)
                .link()
                .on_delete(Restrict),
        ),
        Declaration::Relationship(
            RelationshipDecl::new(UserTask, "task_id", Task)
                .link()
                .on_delete(Cascade),
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("{entity} has no column '{column}'")]
    UnknownColumn { entity: EntityKind, column: String },

    #[error("{principal} cannot be referenced by {dependent}.{foreign_key}: it has a composite key")]
    CompositePrincipal {
        dependent: EntityKind,
        foreign_key: &'static str,
        principal: EntityKind,
    },
}

/// A relationship after conventions and duplicate declarations are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub name: String,
    pub dependent: EntityKind,
    pub foreign_key: &'static str,
    pub principal: EntityKind,
    pub multiplicity: Multiplicity,
    pub required: bool,
    pub on_delete: DeleteBehavior,
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub fn relationship_name(dependent: EntityKind, foreign_key: &str, principal: EntityKind) -> String {
    format!("{}.{} -> {}", dependent.table_name(), foreign_key, principal.table_name())
}

#[derive(Debug, Default)]
pub struct ModelBuilder {
    keys: HashMap<EntityKind, &'static [&'static str]>,
    relationships: Vec<RelationshipDecl>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, declaration: Declaration) -> &mut Self {
        match declaration {
            Declaration::Key { entity, columns } => {
                self.keys.insert(entity, columns);
            }
            Declaration::Relationship(decl) => {
                let existing = self
                    .relationships
                    .iter_mut()
                    .find(|r| r.dependent == decl.dependent && r.foreign_key == decl.foreign_key);
                match existing {
                    Some(slot) => *slot = decl,
                    None => self.relationships.push(decl),
                }
            }
        }
        self
    }

    pub fn declare_all(&mut self, declarations: impl IntoIterator<Item = Declaration>) -> &mut Self {
        for declaration in declarations {
            self.declare(declaration);
        }
        self
    }

    pub fn build(&self) -> Result<Model, ModelError> {
        let mut keys = HashMap::new();
        for kind in EntityKind::ALL {
            // Undeclared keys fall back to a surrogate `id` when the table has one.
            let columns: Vec<&'static str> = match self.keys.get(&kind) {
                Some(columns) => columns.to_vec(),
                None if kind.column("id").is_some() => vec!["id"],
                None => continue,
            };
            for column in &columns {
                if kind.column(column).is_none() {
                    return Err(ModelError::UnknownColumn {
                        entity: kind,
                        column: column.to_string(),
                    });
                }
            }
            keys.insert(kind, columns);
        }

        let mut relationships = Vec::with_capacity(self.relationships.len());
        for decl in &self.relationships {
            let column = decl.dependent.column(decl.foreign_key).ok_or_else(|| {
                ModelError::UnknownColumn {
                    entity: decl.dependent,
                    column: decl.foreign_key.to_string(),
                }
            })?;
            if keys.get(&decl.principal).map(Vec::len) != Some(1) {
                return Err(ModelError::CompositePrincipal {
                    dependent: decl.dependent,
                    foreign_key: decl.foreign_key,
                    principal: decl.principal,
                });
            }

            let required = decl.required.unwrap_or(!column.nullable);
            let on_delete = decl.on_delete.unwrap_or(if required {
                DeleteBehavior::Cascade
            } else {
                DeleteBehavior::NoAction
            });

            relationships.push(Relationship {
                name: relationship_name(decl.dependent, decl.foreign_key, decl.principal),
                dependent: decl.dependent,
                foreign_key: decl.foreign_key,
                principal: decl.principal,
                multiplicity: decl.multiplicity,
                required,
                on_delete,
            });
        }

        Ok(Model { keys, relationships })
    }
}

/// The resolved relationship model. Immutable once built.
#[derive(Debug, Clone)]
pub struct Model {
    keys: HashMap<EntityKind, Vec<&'static str>>,
    relationships: Vec<Relationship>,
}

impl Model {
    /// Model for the employee-monitoring schema.
    pub fn standard() -> Result<Self, ModelError> {
        ModelBuilder::new().declare_all(declarations()).build()
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Key columns of `kind`; empty when the table has neither a declared key
    /// nor an `id` column.
    pub fn key_columns(&self, kind: EntityKind) -> &[&'static str] {
        self.keys.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Relationships in which `principal` is the referenced side.
    pub fn dependents_of(&self, principal: EntityKind) -> impl Iterator<Item = &Relationship> {
        self.relationships
            .iter()
            .filter(move |r| r.principal == principal)
    }

    /// Relationships in which `dependent` holds the foreign key.
    pub fn references_from(&self, dependent: EntityKind) -> impl Iterator<Item = &Relationship> {
        self.relationships
            .iter()
            .filter(move |r| r.dependent == dependent)
    }

    pub fn relationship(&self, dependent: EntityKind, foreign_key: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|r| r.dependent == dependent && r.foreign_key == foreign_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        Model::standard().unwrap()
    }

    #[test]
    fn last_declaration_wins_for_user_task_user() {
        let model = model();
        let rel = model.relationship(EntityKind::UserTask, "user_id").unwrap();
        assert_eq!(rel.on_delete, DeleteBehavior::Restrict);
        assert_eq!(rel.multiplicity, Multiplicity::ManyToManyLink);
        assert!(rel.required);
    }

    #[test]
    fn user_task_task_stays_cascade() {
        let model = model();
        let rel = model.relationship(EntityKind::UserTask, "task_id").unwrap();
        assert_eq!(rel.on_delete, DeleteBehavior::Cascade);
    }

    #[test]
    fn duplicate_declarations_do_not_duplicate_relationships() {
        let model = model();
        let count = model
            .relationships()
            .iter()
            .filter(|r| r.dependent == EntityKind::UserTask)
            .count();
        assert_eq!(count, 2);
        assert_eq!(model.relationships().len(), 11);
    }

    #[test]
    fn branch_head_is_restricted_and_optional() {
        let model = model();
        let rel = model.relationship(EntityKind::Branch, "head_user_id").unwrap();
        assert_eq!(rel.on_delete, DeleteBehavior::Restrict);
        assert!(!rel.required);
        assert_eq!(rel.name, "branches.head_user_id -> users");
    }

    #[test]
    fn optional_owner_references_cascade() {
        let model = model();
        for (kind, fk) in [
            (EntityKind::Task, "project_id"),
            (EntityKind::Task, "assigned_to"),
            (EntityKind::Screenshot, "user_id"),
            (EntityKind::ActivityLog, "user_id"),
            (EntityKind::LeaveRequest, "user_id"),
            (EntityKind::Notification, "user_id"),
        ] {
            let rel = model.relationship(kind, fk).unwrap();
            assert!(!rel.required, "{} should be optional", rel.name);
            assert_eq!(rel.on_delete, DeleteBehavior::Cascade, "{}", rel.name);
        }
    }

    #[test]
    fn project_member_edges_cascade_by_convention() {
        let model = model();
        for fk in ["user_id", "project_id"] {
            let rel = model.relationship(EntityKind::ProjectMember, fk).unwrap();
            assert!(rel.required);
            assert_eq!(rel.on_delete, DeleteBehavior::Cascade);
        }
    }

    #[test]
    fn composite_keys_resolve() {
        let model = model();
        assert_eq!(model.key_columns(EntityKind::UserTask), &["user_id", "task_id"]);
        assert_eq!(model.key_columns(EntityKind::ProjectMember), &["user_id", "project_id"]);
        assert_eq!(model.key_columns(EntityKind::Holiday), &["id"]);
    }

    #[test]
    fn redeclaring_swaps_policy_in_place() {
        let mut builder = ModelBuilder::new();
        builder
            .declare(Declaration::Relationship(
                RelationshipDecl::new(EntityKind::Screenshot, "user_id", EntityKind::User)
                    .on_delete(DeleteBehavior::Cascade),
            ))
            .declare(Declaration::Relationship(RelationshipDecl::new(
                EntityKind::Notification,
                "user_id",
                EntityKind::User,
            )))
            .declare(Declaration::Relationship(
                RelationshipDecl::new(EntityKind::Screenshot, "user_id", EntityKind::User)
                    .on_delete(DeleteBehavior::Restrict),
            ));
        let model = builder.build().unwrap();
        assert_eq!(model.relationships().len(), 2);
        assert_eq!(model.relationships()[0].dependent, EntityKind::Screenshot);
        assert_eq!(model.relationships()[0].on_delete, DeleteBehavior::Restrict);
        // nullable column, no policy given
        assert_eq!(model.relationships()[1].on_delete, DeleteBehavior::NoAction);
    }

    #[test]
    fn undeclared_link_key_leaves_table_keyless() {
        let model = ModelBuilder::new().build().unwrap();
        assert!(model.relationships().is_empty());
        assert!(model.key_columns(EntityKind::UserTask).is_empty());
        assert_eq!(model.key_columns(EntityKind::Task), &["id"]);
    }

    #[test]
    fn declared_key_must_exist() {
        let mut builder = ModelBuilder::new();
        builder.declare(Declaration::Key {
            entity: EntityKind::UserTask,
            columns: &["user_id", "project_id"],
        });
        assert!(matches!(
            builder.build(),
            Err(ModelError::UnknownColumn { entity: EntityKind::UserTask, .. })
        ));
    }

    #[test]
    fn unknown_foreign_key_is_rejected() {
        let mut builder = ModelBuilder::new();
        builder.declare(Declaration::Relationship(RelationshipDecl::new(
            EntityKind::Holiday,
            "user_id",
            EntityKind::User,
        )));
        assert!(matches!(builder.build(), Err(ModelError::UnknownColumn { .. })));
    }

    #[test]
    fn composite_principal_is_rejected() {
        let mut builder = ModelBuilder::new();
        builder
            .declare(Declaration::Key {
                entity: EntityKind::UserTask,
                columns: &["user_id", "task_id"],
            })
            .declare(Declaration::Relationship(RelationshipDecl::new(
                EntityKind::Notification,
                "user_id",
                EntityKind::UserTask,
            )));
        assert!(matches!(
            builder.build(),
            Err(ModelError::CompositePrincipal { .. })
        ));
    }
}
