//! Benchmark error types.

use sea_orm::DbErr;
use thiserror::Error;

/// Result alias used throughout the harness.
pub type Result<T> = std::result::Result<T, Error>;

/// Harness errors.
///
/// Everything except a missing row is fatal to the running scenario.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Opening or closing the raw connection failed.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// Opening or closing the ORM connection failed.
    #[error("orm connection error: {0}")]
    OrmConnection(#[source] DbErr),

    /// Creating or dropping the benchmark table failed.
    #[error("schema error: {0}")]
    Schema(#[source] sqlx::Error),

    /// Statement execution or row decoding failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// ORM query failed.
    #[error("orm error: {0}")]
    Orm(#[from] DbErr),
}

impl Error {
    /// Whether this error only reports that no row matched.
    pub fn is_row_not_found(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::RowNotFound) => true,
            Error::Orm(DbErr::RecordNotFound(_)) => true,
            _ => false,
        }
    }
}
