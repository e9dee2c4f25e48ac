//! Connection provider.
//!
//! Raw scenarios drive a single driver-native sqlx connection chosen by the
//! URL scheme, so statement caching and release go through the driver itself.
//! The ORM variant opens a second, independently configured sea-orm
//! connection to the same database and keeps both open for the duration of
//! the scenario.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sqlx::{Connection, MySqlConnection, PgConnection, SqliteConnection};
use tracing::debug;

use crate::config::BenchConfig;
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// Evaluate `$body` with `$conn` bound to the native connection inside `$raw`.
macro_rules! with_native {
    ($raw:expr, $conn:ident => $body:expr) => {
        match $raw {
            $crate::connection::RawConnection::MySql($conn) => $body,
            $crate::connection::RawConnection::Postgres($conn) => $body,
            $crate::connection::RawConnection::Sqlite($conn) => $body,
        }
    };
}
pub(crate) use with_native;

/// A raw database connection for one of the supported drivers.
#[derive(Debug)]
pub enum RawConnection {
    MySql(MySqlConnection),
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
}

impl RawConnection {
    pub fn dialect(&self) -> Dialect {
        match self {
            RawConnection::MySql(_) => Dialect::MySql,
            RawConnection::Postgres(_) => Dialect::Postgres,
            RawConnection::Sqlite(_) => Dialect::Sqlite,
        }
    }

    /// Number of statements the driver currently keeps prepared.
    pub fn cached_statements_size(&self) -> usize {
        with_native!(self, conn => conn.cached_statements_size())
    }

    /// Close every statement the driver keeps prepared.
    pub async fn clear_cached_statements(&mut self) -> Result<()> {
        with_native!(self, conn => conn.clear_cached_statements().await)?;
        Ok(())
    }
}

/// Open the raw connection.
pub async fn connect(config: &BenchConfig) -> Result<RawConnection> {
    let dialect = config.dialect()?;
    let url = config.database_url.as_str();

    let conn = match dialect {
        Dialect::MySql => MySqlConnection::connect(url).await.map(RawConnection::MySql),
        Dialect::Postgres => PgConnection::connect(url).await.map(RawConnection::Postgres),
        Dialect::Sqlite => SqliteConnection::connect(url).await.map(RawConnection::Sqlite),
    }
    .map_err(Error::Connection)?;
    debug!(?dialect, "raw connection opened");
    Ok(conn)
}

/// Open the ORM connection.
///
/// The underlying pool is pinned to one connection so the ORM path measures
/// the same single-session workload as the raw path.
pub async fn connect_orm(config: &BenchConfig) -> Result<DatabaseConnection> {
    let dialect = config.dialect()?;

    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .map_err(Error::OrmConnection)?;
    debug!(?dialect, "orm connection opened");
    Ok(db)
}

/// Close the raw connection, reporting any shutdown error.
pub async fn close(conn: RawConnection) -> Result<()> {
    with_native!(conn, conn => conn.close().await).map_err(Error::Connection)
}

/// Close the ORM connection, reporting any shutdown error.
pub async fn close_orm(db: DatabaseConnection) -> Result<()> {
    db.close().await.map_err(Error::OrmConnection)
}
