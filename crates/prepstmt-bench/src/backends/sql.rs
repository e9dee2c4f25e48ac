//! Raw statement backend.
//!
//! Until [`RowStore::prepare`] is called every statement runs unprepared:
//! sqlx is told not to keep it, so the server parses and plans it on each
//! execution. Preparing compiles the statement into the driver's statement
//! cache, where later executions find it, until [`RowStore::release`] closes
//! every cached statement on the server.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::Executor;
use tracing::debug;

use super::RowStore;
use crate::connection::{with_native, RawConnection};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::harness::Operation;
use crate::Record;

/// Row store issuing SQL directly on a borrowed raw connection.
pub struct SqlStore<'c> {
    conn: &'c mut RawConnection,
    dialect: Dialect,
    random_order: bool,
    prepared: [bool; 3],
}

impl<'c> SqlStore<'c> {
    /// Create a store over `conn` with random multi-row ordering enabled.
    pub fn new(conn: &'c mut RawConnection) -> Self {
        let dialect = conn.dialect();
        Self {
            conn,
            dialect,
            random_order: true,
            prepared: [false; 3],
        }
    }

    /// Enable or disable the random ordering clause on multi-row fetches.
    pub fn with_random_order(mut self, random_order: bool) -> Self {
        self.random_order = random_order;
        self
    }

    /// Whether the statement for `operation` is currently prepared.
    pub fn is_prepared(&self, operation: Operation) -> bool {
        self.prepared[slot(operation)]
    }

    /// Number of statements the connection keeps compiled.
    pub fn cached_statements(&self) -> usize {
        self.conn.cached_statements_size()
    }

    fn sql(&self, operation: Operation) -> &'static str {
        match operation {
            Operation::Insert => self.dialect.insert_sql(),
            Operation::FetchOne => self.dialect.select_one_sql(),
            Operation::FetchMany => self.dialect.select_many_sql(self.random_order),
        }
    }
}

fn slot(operation: Operation) -> usize {
    match operation {
        Operation::Insert => 0,
        Operation::FetchOne => 1,
        Operation::FetchMany => 2,
    }
}

#[async_trait]
impl RowStore for SqlStore<'_> {
    fn label(&self) -> &'static str {
        "sql"
    }

    async fn prepare(&mut self, operation: Operation) -> Result<()> {
        let sql = self.sql(operation);
        with_native!(&mut *self.conn, conn => (&mut *conn).prepare(sql).await.map(|_| ()))?;
        self.prepared[slot(operation)] = true;
        debug!(sql, "statement prepared");
        Ok(())
    }

    async fn insert(&mut self, data: &str) -> Result<()> {
        let sql = self.sql(Operation::Insert);
        let persistent = self.is_prepared(Operation::Insert);
        with_native!(&mut *self.conn, conn => {
            sqlx::query(sql)
                .bind(data)
                .persistent(persistent)
                .execute(&mut *conn)
                .await
                .map(|_| ())
        })?;
        Ok(())
    }

    async fn fetch_one(&mut self, id: i32) -> Result<Option<Record>> {
        let sql = self.sql(Operation::FetchOne);
        let persistent = self.is_prepared(Operation::FetchOne);
        let row = with_native!(&mut *self.conn, conn => {
            sqlx::query_as::<_, (i32, String)>(sql)
                .bind(id)
                .persistent(persistent)
                .fetch_optional(&mut *conn)
                .await
        })?;
        Ok(row.map(|(id, data)| Record { id, data }))
    }

    async fn fetch_many(&mut self, threshold: i32, out: &mut Vec<Record>) -> Result<usize> {
        let sql = self.sql(Operation::FetchMany);
        let persistent = self.is_prepared(Operation::FetchMany);
        let scanned = with_native!(&mut *self.conn, conn => {
            let mut rows = sqlx::query_as::<_, (i32, String)>(sql)
                .bind(threshold)
                .persistent(persistent)
                .fetch(&mut *conn);

            let mut scanned = 0;
            while let Some((id, data)) = rows.try_next().await? {
                out.push(Record { id, data });
                scanned += 1;
            }
            scanned
        });
        Ok(scanned)
    }

    async fn release(&mut self) -> Result<()> {
        self.conn.clear_cached_statements().await?;
        self.prepared = [false; 3];
        debug!(
            cached = self.conn.cached_statements_size(),
            "prepared statements released"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BenchConfig;
    use crate::connection::connect;
    use crate::schema::{create_table, row_count};

    async fn open(dir: &tempfile::TempDir) -> RawConnection {
        let path = dir.path().join("sql.db");
        let config = BenchConfig::new(format!("sqlite://{}?mode=rwc", path.display()));
        let mut conn = connect(&config).await.unwrap();
        create_table(&mut conn).await.unwrap();
        conn
    }

    #[tokio::test]
    async fn test_insert_and_fetch_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;
        let mut store = SqlStore::new(&mut conn);

        let values: Vec<String> = (0..10).map(|i| format!("row-{i}")).collect();
        for value in &values {
            store.insert(value).await.unwrap();
        }

        for (i, value) in values.iter().enumerate() {
            let id = i as i32 + 1;
            let record = store.fetch_one(id).await.unwrap().unwrap();
            assert_eq!(record.id, id);
            assert_eq!(&record.data, value);
        }
    }

    #[tokio::test]
    async fn test_fetch_one_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;
        let mut store = SqlStore::new(&mut conn);

        store.insert("only").await.unwrap();
        assert!(store.fetch_one(0).await.unwrap().is_none());
        assert!(store.fetch_one(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_many_above_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;
        let mut store = SqlStore::new(&mut conn);

        for i in 0..20 {
            store.insert(&format!("row-{i}")).await.unwrap();
        }

        for threshold in [0, 5, 19, 20, 25] {
            let mut out = Vec::with_capacity(20usize.saturating_sub(threshold as usize));
            let scanned = store.fetch_many(threshold, &mut out).await.unwrap();

            assert_eq!(scanned, out.len());
            assert_eq!(scanned, 20usize.saturating_sub(threshold as usize));
            assert!(out.iter().all(|r| r.id > threshold));
        }
    }

    #[tokio::test]
    async fn test_prepared_paths_match_unprepared() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;
        let mut store = SqlStore::new(&mut conn).with_random_order(false);

        store.insert("unprepared").await.unwrap();

        for operation in [Operation::Insert, Operation::FetchOne, Operation::FetchMany] {
            assert!(!store.is_prepared(operation));
            store.prepare(operation).await.unwrap();
            assert!(store.is_prepared(operation));
        }

        store.insert("prepared").await.unwrap();

        let first = store.fetch_one(1).await.unwrap().unwrap();
        assert_eq!(first.data, "unprepared");
        let second = store.fetch_one(2).await.unwrap().unwrap();
        assert_eq!(second.data, "prepared");

        let mut out = Vec::new();
        assert_eq!(store.fetch_many(0, &mut out).await.unwrap(), 2);
        assert_eq!(out[0], first);
        assert_eq!(out[1], second);
    }

    #[tokio::test]
    async fn test_unprepared_paths_leave_cache_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;
        let mut store = SqlStore::new(&mut conn);

        store.insert("row").await.unwrap();
        store.fetch_one(1).await.unwrap().unwrap();
        let mut out = Vec::new();
        store.fetch_many(0, &mut out).await.unwrap();

        assert_eq!(store.cached_statements(), 0);
    }

    #[tokio::test]
    async fn test_release_clears_statements() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;

        {
            let mut store = SqlStore::new(&mut conn);
            store.insert("before prepare").await.unwrap();
            assert_eq!(store.cached_statements(), 0);

            store.prepare(Operation::FetchOne).await.unwrap();
            assert_eq!(store.cached_statements(), 1);

            // Executions reuse the compiled statement.
            for _ in 0..5 {
                store.fetch_one(1).await.unwrap().unwrap();
            }
            assert_eq!(store.cached_statements(), 1);

            store.prepare(Operation::Insert).await.unwrap();
            store.insert("prepared").await.unwrap();
            assert_eq!(store.cached_statements(), 2);

            store.release().await.unwrap();
            assert!(!store.is_prepared(Operation::Insert));
            assert!(!store.is_prepared(Operation::FetchOne));
            assert_eq!(store.cached_statements(), 0);

            // Falls back to the unprepared path.
            store.insert("after release").await.unwrap();
            assert_eq!(store.cached_statements(), 0);
        }

        assert_eq!(conn.cached_statements_size(), 0);
        assert_eq!(row_count(&mut conn).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_fetch_many_without_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;
        crate::schema::drop_table(&mut conn).await.unwrap();

        let mut store = SqlStore::new(&mut conn);
        let mut out = Vec::new();
        let err = store.fetch_many(0, &mut out).await.unwrap_err();
        assert!(!err.is_row_not_found());
    }
}
