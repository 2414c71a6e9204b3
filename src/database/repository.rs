use std::marker::PhantomData;

use crate::database::context::{AppDbContext, Collection};
use crate::database::entity::{EntityKey, EntityModel, KeyValue, SqlValue};
use crate::database::manager::DatabaseError;
use crate::database::unit_of_work::UnitOfWork;

/// Single-entity reads and writes over the persistence context. Each write is
/// its own unit of work.
///
/// Callers are expected to be authenticated already; repositories never check
/// who is asking.
pub struct Repository<T> {
    ctx: AppDbContext,
    _phantom: PhantomData<T>,
}

impl<T: EntityModel + Clone> Repository<T> {
    pub fn new(ctx: AppDbContext) -> Self {
        Self {
            ctx,
            _phantom: PhantomData,
        }
    }

    fn collection(&self) -> Collection<'_, T> {
        self.ctx.set::<T>()
    }

    pub async fn list(&self) -> Result<Vec<T>, DatabaseError> {
        self.collection().all().await
    }

    pub async fn list_by(&self, column: &str, value: impl Into<SqlValue>) -> Result<Vec<T>, DatabaseError> {
        self.collection().find_by(column, value).await
    }

    pub async fn find(&self, key: impl Into<KeyValue>) -> Result<Option<T>, DatabaseError> {
        self.collection().find(key).await
    }

    /// Like [`find`](Self::find) but a missing row is an error.
    pub async fn get(&self, key: impl Into<KeyValue>) -> Result<T, DatabaseError> {
        let key = key.into();
        match self.collection().find(key).await? {
            Some(record) => Ok(record),
            None => Err(DatabaseError::NotFound(EntityKey::of::<T>(key).to_string())),
        }
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        self.collection().count().await
    }

    pub async fn create(&self, record: T) -> Result<T, DatabaseError> {
        let mut uow = UnitOfWork::new();
        uow.add(record.clone());
        uow.commit(&self.ctx).await?;
        Ok(record)
    }

    pub async fn update(&self, record: T) -> Result<T, DatabaseError> {
        let mut uow = UnitOfWork::new();
        uow.update(record.clone());
        uow.commit(&self.ctx).await?;
        Ok(record)
    }

    pub async fn delete(&self, key: impl Into<KeyValue>) -> Result<(), DatabaseError> {
        let mut uow = UnitOfWork::new();
        uow.remove(EntityKey::of::<T>(key));
        uow.commit(&self.ctx).await?;
        Ok(())
    }
}
