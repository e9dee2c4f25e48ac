//! SQL dialects.
//!
//! The benchmark statements are fixed; only placeholders, the auto-increment
//! column definition and the random ordering function differ by backend.

use crate::error::{Error, Result};

/// Backend SQL flavour, chosen by URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySql,
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Resolve the dialect from a connection URL.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| Error::Config(format!("missing URL scheme in `{url}`")))?;

        match scheme {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(Error::Config(format!("unsupported scheme `{other}`"))),
        }
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for the benchmark table.
    pub fn create_table_sql(self) -> &'static str {
        match self {
            Dialect::MySql => {
                "CREATE TABLE IF NOT EXISTS test (
                    id INT NOT NULL AUTO_INCREMENT,
                    data VARCHAR(255) NOT NULL,
                    PRIMARY KEY (id)
                )"
            }
            Dialect::Postgres => {
                "CREATE TABLE IF NOT EXISTS test (
                    id SERIAL PRIMARY KEY,
                    data VARCHAR(255) NOT NULL
                )"
            }
            // AUTOINCREMENT keeps ids monotonic even after deletes.
            Dialect::Sqlite => {
                "CREATE TABLE IF NOT EXISTS test (
                    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                    data VARCHAR(255) NOT NULL
                )"
            }
        }
    }

    pub fn insert_sql(self) -> &'static str {
        match self {
            Dialect::Postgres => "INSERT INTO test (data) VALUES ($1)",
            _ => "INSERT INTO test (data) VALUES (?)",
        }
    }

    pub fn select_one_sql(self) -> &'static str {
        match self {
            Dialect::Postgres => "SELECT id, data FROM test WHERE id = $1",
            _ => "SELECT id, data FROM test WHERE id = ?",
        }
    }

    /// Multi-row fetch above a threshold, optionally in random order.
    pub fn select_many_sql(self, random_order: bool) -> &'static str {
        match (self, random_order) {
            (Dialect::MySql, true) => "SELECT id, data FROM test WHERE id > ? ORDER BY RAND()",
            (Dialect::Postgres, true) => {
                "SELECT id, data FROM test WHERE id > $1 ORDER BY RANDOM()"
            }
            (Dialect::Sqlite, true) => "SELECT id, data FROM test WHERE id > ? ORDER BY RANDOM()",
            (Dialect::Postgres, false) => "SELECT id, data FROM test WHERE id > $1",
            (_, false) => "SELECT id, data FROM test WHERE id > ?",
        }
    }
}
