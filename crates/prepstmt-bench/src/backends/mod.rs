//! Row store backends.
//!
//! Scenario logic is written once against [`RowStore`]; the raw-statement and
//! ORM paths each implement it over their own connection.

pub mod orm;
pub mod sql;

pub use orm::OrmStore;
pub use sql::SqlStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::harness::Operation;
use crate::Record;

/// The operations every benchmark strategy must provide.
#[async_trait]
pub trait RowStore: Send {
    /// Short backend name for log output.
    fn label(&self) -> &'static str;

    /// Compile the statement behind `operation` ahead of time.
    ///
    /// Backends without an explicit prepare step treat this as a no-op.
    async fn prepare(&mut self, operation: Operation) -> Result<()>;

    /// Insert one row with the given text.
    async fn insert(&mut self, data: &str) -> Result<()>;

    /// Fetch the row with exactly this id, if any.
    async fn fetch_one(&mut self, id: i32) -> Result<Option<Record>>;

    /// Append every row with `id > threshold` to `out`, returning how many
    /// were scanned.
    async fn fetch_many(&mut self, threshold: i32, out: &mut Vec<Record>) -> Result<usize>;

    /// Release anything compiled by [`RowStore::prepare`].
    async fn release(&mut self) -> Result<()>;
}
