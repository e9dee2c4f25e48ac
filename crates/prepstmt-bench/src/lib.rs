//! Prepared Statement Benchmark Suite
//!
//! Measures insert, single-row fetch and multi-row fetch latency against a
//! relational database under three execution strategies.
//!
//! # Strategies
//!
//! - **Non-prepared**: every execution is parsed and planned by the server anew
//! - **Prepared**: the statement is compiled once, outside the timed region
//! - **ORM**: the same operations issued through sea-orm entity calls
//!
//! # Scenarios
//!
//! Each [`Scenario`] pairs an [`Operation`] with a [`Strategy`] and runs the
//! full protocol: connect, create the `test` table, seed fixture rows for
//! reads, prepare, time the iterations, release, drop the table, disconnect.

pub mod backends;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod schema;

pub use backends::{OrmStore, RowStore, SqlStore};
pub use config::BenchConfig;
pub use connection::RawConnection;
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use fixtures::{random_data, seed};
pub use harness::{init_tracing, Operation, Scenario, Strategy};

/// A row of the `test` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub id: i32,
    pub data: String,
}
