pub mod codec;
pub mod context;
pub mod entity;
pub mod integrity;
pub mod manager;
pub mod models;
pub mod relationships;
pub mod repository;
pub mod schema;
pub mod unit_of_work;

pub use codec::{DecodeError, SkillMap};
pub use context::{AppDbContext, Collection};
pub use entity::{EntityKey, EntityKind, EntityModel, KeyValue, SqlValue};
pub use manager::DatabaseError;
pub use relationships::{DeleteBehavior, Model, ModelError, Relationship};
pub use repository::Repository;
pub use unit_of_work::{CommitSummary, UnitOfWork};
