use sqlx::SqlitePool;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::entity::{EntityModel, KeyValue, SqlValue, bind_value};
use crate::database::manager::{self, DatabaseError};
use crate::database::models::{
    ActivityLog, AppSettings, Branch, Holiday, LeaveRequest, Notification, Project, ProjectMember,
    Screenshot, Task, User, UserTask,
};
use crate::database::relationships::Model;
use crate::database::schema;
use crate::database::unit_of_work::key_predicate;

/// The persistence context: a connection pool plus the relationship model it
/// was built with. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppDbContext {
    pool: SqlitePool,
    model: Arc<Model>,
}

impl AppDbContext {
    /// Open the configured database and bring its schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = manager::connect(config).await?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database, used by tests and the CLI dry runs.
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let pool = manager::connect_in_memory().await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool. The pool must have foreign keys enabled.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, DatabaseError> {
        let model = Model::standard()?;
        schema::apply(&pool, &model).await?;
        Ok(Self {
            pool,
            model: Arc::new(model),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }

    pub fn set<T: EntityModel>(&self) -> Collection<'_, T> {
        Collection {
            ctx: self,
            _entity: PhantomData,
        }
    }

    pub fn users(&self) -> Collection<'_, User> {
        self.set()
    }

    pub fn branches(&self) -> Collection<'_, Branch> {
        self.set()
    }

    pub fn projects(&self) -> Collection<'_, Project> {
        self.set()
    }

    pub fn tasks(&self) -> Collection<'_, Task> {
        self.set()
    }

    pub fn user_tasks(&self) -> Collection<'_, UserTask> {
        self.set()
    }

    pub fn project_members(&self) -> Collection<'_, ProjectMember> {
        self.set()
    }

    pub fn screenshots(&self) -> Collection<'_, Screenshot> {
        self.set()
    }

    pub fn activity_logs(&self) -> Collection<'_, ActivityLog> {
        self.set()
    }

    pub fn leave_requests(&self) -> Collection<'_, LeaveRequest> {
        self.set()
    }

    pub fn notifications(&self) -> Collection<'_, Notification> {
        self.set()
    }

    pub fn app_settings(&self) -> Collection<'_, AppSettings> {
        self.set()
    }

    pub fn holidays(&self) -> Collection<'_, Holiday> {
        self.set()
    }
}

/// Read access to one table. Writes go through a
/// [`UnitOfWork`](crate::database::unit_of_work::UnitOfWork).
pub struct Collection<'a, T> {
    ctx: &'a AppDbContext,
    _entity: PhantomData<T>,
}

impl<'a, T: EntityModel> Collection<'a, T> {
    fn table(&self) -> &'static str {
        T::KIND.table_name()
    }

    pub async fn all(&self) -> Result<Vec<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {}", self.table());
        let rows = sqlx::query(&sql).fetch_all(self.ctx.pool()).await?;
        rows.iter().map(T::from_row).collect()
    }

    pub async fn find(&self, key: impl Into<KeyValue>) -> Result<Option<T>, DatabaseError> {
        let key = key.into();
        let sql = format!(
            "SELECT * FROM {} WHERE {}",
            self.table(),
            key_predicate(self.ctx.model().key_columns(T::KIND))
        );
        let mut query = sqlx::query(&sql);
        for id in key.values() {
            query = query.bind(id);
        }
        let row = query.fetch_optional(self.ctx.pool()).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Rows whose `column` equals `value`. The column must belong to the table.
    pub async fn find_by(&self, column: &str, value: impl Into<SqlValue>) -> Result<Vec<T>, DatabaseError> {
        let column = T::KIND
            .column(column)
            .ok_or_else(|| DatabaseError::UnknownColumn {
                table: self.table(),
                column: column.to_string(),
            })?;
        let sql = format!("SELECT * FROM {} WHERE {} = ?", self.table(), column.name);
        let rows = bind_value(sqlx::query(&sql), value.into())
            .fetch_all(self.ctx.pool())
            .await?;
        rows.iter().map(T::from_row).collect()
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table());
        let count = sqlx::query_scalar(&sql).fetch_one(self.ctx.pool()).await?;
        Ok(count)
    }
}
