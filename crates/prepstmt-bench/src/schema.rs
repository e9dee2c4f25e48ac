//! Benchmark table lifecycle.
//!
//! DDL goes over the text protocol so it never lands in the statement cache
//! that the prepared scenarios exercise.

use tracing::debug;

use crate::connection::{with_native, RawConnection};
use crate::error::{Error, Result};

/// Name of the benchmark table.
pub const TABLE_NAME: &str = "test";

/// Create the benchmark table. A no-op if it already exists.
pub async fn create_table(conn: &mut RawConnection) -> Result<()> {
    let sql = conn.dialect().create_table_sql();
    with_native!(conn, c => sqlx::raw_sql(sql).execute(&mut *c).await.map(|_| ()))
        .map_err(Error::Schema)?;
    debug!(table = TABLE_NAME, "table created");
    Ok(())
}

/// Drop the benchmark table.
///
/// There is no `IF EXISTS` guard: dropping a missing table is an error.
pub async fn drop_table(conn: &mut RawConnection) -> Result<()> {
    with_native!(conn, c => sqlx::raw_sql("DROP TABLE test").execute(&mut *c).await.map(|_| ()))
        .map_err(Error::Schema)?;
    debug!(table = TABLE_NAME, "table dropped");
    Ok(())
}

/// Count the rows currently in the benchmark table.
pub async fn row_count(conn: &mut RawConnection) -> Result<i64> {
    let count = with_native!(conn, c => {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM test")
            .fetch_one(&mut *c)
            .await
    })?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BenchConfig;
    use crate::connection::connect;

    async fn open(dir: &tempfile::TempDir) -> RawConnection {
        let path = dir.path().join("schema.db");
        let config = BenchConfig::new(format!("sqlite://{}?mode=rwc", path.display()));
        connect(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_twice() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;

        create_table(&mut conn).await.unwrap();
        create_table(&mut conn).await.unwrap();
        assert_eq!(row_count(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_drop_missing_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;

        let err = drop_table(&mut conn).await.unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(!err.is_row_not_found());
    }

    #[tokio::test]
    async fn test_create_then_drop() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;

        create_table(&mut conn).await.unwrap();
        drop_table(&mut conn).await.unwrap();

        // Second drop hits the strict path.
        assert!(matches!(
            drop_table(&mut conn).await,
            Err(Error::Schema(_))
        ));
    }

    #[tokio::test]
    async fn test_row_count_without_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir).await;

        assert!(matches!(
            row_count(&mut conn).await,
            Err(Error::Database(_))
        ));
    }
}
