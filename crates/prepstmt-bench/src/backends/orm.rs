//! ORM backend.
//!
//! Issues the benchmark operations through sea-orm entity calls, letting the
//! ORM build the SQL on every call.

use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::debug;

use super::RowStore;
use crate::entity::record;
use crate::error::Result;
use crate::harness::Operation;
use crate::Record;

/// Row store backed by a sea-orm connection.
pub struct OrmStore {
    db: DatabaseConnection,
}

impl OrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Give the connection back, e.g. to close it.
    pub fn into_inner(self) -> DatabaseConnection {
        self.db
    }
}

#[async_trait]
impl RowStore for OrmStore {
    fn label(&self) -> &'static str {
        "orm"
    }

    async fn prepare(&mut self, operation: Operation) -> Result<()> {
        debug!(%operation, "orm store has no prepare step");
        Ok(())
    }

    async fn insert(&mut self, data: &str) -> Result<()> {
        let model = record::ActiveModel {
            id: NotSet,
            data: Set(data.to_owned()),
        };
        record::Entity::insert(model).exec(&self.db).await?;
        Ok(())
    }

    async fn fetch_one(&mut self, id: i32) -> Result<Option<Record>> {
        let model = record::Entity::find()
            .filter(record::Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(model.map(Record::from))
    }

    async fn fetch_many(&mut self, threshold: i32, out: &mut Vec<Record>) -> Result<usize> {
        let models = record::Entity::find()
            .filter(record::Column::Id.gt(threshold))
            .all(&self.db)
            .await?;

        let scanned = models.len();
        out.extend(models.into_iter().map(Record::from));
        Ok(scanned)
    }

    async fn release(&mut self) -> Result<()> {
        Ok(())
    }
}
