//! Benchmark scenarios.
//!
//! A [`Scenario`] owns the whole measurement protocol. Only the loop of
//! operations is timed; connecting, schema setup, seeding, preparing and all
//! teardown happen outside the measured window.

use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::backends::{OrmStore, RowStore, SqlStore};
use crate::config::BenchConfig;
use crate::connection::{close, close_orm, connect, connect_orm};
use crate::error::Result;
use crate::fixtures::{random_data, random_id, seed};
use crate::schema::{create_table, drop_table};

/// The timed database operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Single-row insert.
    Insert,
    /// Fetch one row by exact id.
    FetchOne,
    /// Fetch every row above a random threshold.
    FetchMany,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Insert, Operation::FetchOne, Operation::FetchMany];

    pub fn label(self) -> &'static str {
        match self {
            Operation::Insert => "exec",
            Operation::FetchOne => "query_row",
            Operation::FetchMany => "query",
        }
    }

    /// Read operations run against a seeded fixture.
    pub fn reads(self) -> bool {
        !matches!(self, Operation::Insert)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How statements reach the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Raw SQL, parsed and planned on every execution.
    NonPrepared,
    /// Raw SQL compiled once before timing starts.
    Prepared,
    /// sea-orm entity calls.
    Orm,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::NonPrepared, Strategy::Prepared, Strategy::Orm];

    pub fn label(self) -> &'static str {
        match self {
            Strategy::NonPrepared => "non_prepared",
            Strategy::Prepared => "prepared",
            Strategy::Orm => "orm",
        }
    }

    /// Whether the scenario compiles its statement before timing.
    pub fn prepares(self) -> bool {
        matches!(self, Strategy::Prepared)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One benchmark entry point: an operation under a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scenario {
    pub operation: Operation,
    pub strategy: Strategy,
}

impl Scenario {
    /// Every operation under every strategy.
    pub const ALL: [Scenario; 9] = [
        Scenario::new(Operation::Insert, Strategy::NonPrepared),
        Scenario::new(Operation::Insert, Strategy::Prepared),
        Scenario::new(Operation::Insert, Strategy::Orm),
        Scenario::new(Operation::FetchOne, Strategy::NonPrepared),
        Scenario::new(Operation::FetchOne, Strategy::Prepared),
        Scenario::new(Operation::FetchOne, Strategy::Orm),
        Scenario::new(Operation::FetchMany, Strategy::NonPrepared),
        Scenario::new(Operation::FetchMany, Strategy::Prepared),
        Scenario::new(Operation::FetchMany, Strategy::Orm),
    ];

    pub const fn new(operation: Operation, strategy: Strategy) -> Self {
        Self {
            operation,
            strategy,
        }
    }

    /// Stable `operation/strategy` name, e.g. `exec/prepared`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Run the full protocol and return the time spent in the operation loop.
    ///
    /// Connects, creates the table, runs [`Scenario::execute`], drops the
    /// table and closes every connection. The first error aborts the run.
    #[instrument(skip_all, fields(scenario = %self, iters = iters))]
    pub async fn run(&self, config: &BenchConfig, iters: u64) -> Result<Duration> {
        let mut conn = connect(config).await?;
        create_table(&mut conn).await?;

        let (elapsed, orm) = match self.strategy {
            Strategy::Orm => {
                let mut store = OrmStore::new(connect_orm(config).await?);
                let elapsed = self.execute(&mut store, config, iters).await?;
                (elapsed, Some(store.into_inner()))
            }
            Strategy::NonPrepared | Strategy::Prepared => {
                let mut store = SqlStore::new(&mut conn).with_random_order(config.random_order);
                let elapsed = self.execute(&mut store, config, iters).await?;
                (elapsed, None)
            }
        };

        drop_table(&mut conn).await?;
        if let Some(db) = orm {
            close_orm(db).await?;
        }
        close(conn).await?;

        info!(?elapsed, "scenario complete");
        Ok(elapsed)
    }

    /// Seed, prepare, time `iters` operations and release against `store`.
    ///
    /// The table must already exist and is left in place.
    pub async fn execute(
        &self,
        store: &mut dyn RowStore,
        config: &BenchConfig,
        iters: u64,
    ) -> Result<Duration> {
        let bound = config.id_bound()?;

        if self.operation.reads() {
            let seeded = seed(store, config.fixture_rows).await?;
            debug!(rows = seeded.len(), backend = store.label(), "fixture seeded");
        }

        if self.strategy.prepares() {
            store.prepare(self.operation).await?;
        }

        let mut rng = StdRng::from_entropy();
        let mut missed = 0u64;

        let start = Instant::now();
        for _ in 0..iters {
            match self.operation {
                Operation::Insert => store.insert(&random_data()).await?,
                Operation::FetchOne => match store.fetch_one(random_id(&mut rng, bound)).await {
                    Ok(Some(record)) => {
                        black_box(record);
                    }
                    Ok(None) => missed += 1,
                    Err(e) if e.is_row_not_found() => missed += 1,
                    Err(e) => return Err(e),
                },
                Operation::FetchMany => {
                    let threshold = random_id(&mut rng, bound);
                    let mut records = Vec::with_capacity((bound - threshold) as usize);
                    match store.fetch_many(threshold, &mut records).await {
                        Ok(_) => {
                            black_box(records);
                        }
                        Err(e) if e.is_row_not_found() => missed += 1,
                        Err(e) => return Err(e),
                    }
                }
            }
        }
        let elapsed = start.elapsed();

        if self.strategy.prepares() {
            store.release().await?;
        }

        debug!(iters, missed, "operation loop finished");
        Ok(elapsed)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.operation, self.strategy)
    }
}

/// Install the tracing subscriber for bench binaries.
///
/// Honors `RUST_LOG`, defaulting to warnings from this crate. Safe to call
/// more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prepstmt_bench=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Benchmark helper: one criterion group per operation, one entry per strategy.
///
/// Uses `iter_custom` so only the operation loop reported by
/// [`Scenario::run`] counts; a failed scenario panics and aborts the run.
#[macro_export]
macro_rules! bench_operation {
    ($c:expr, $rt:expr, $config:expr, $operation:expr) => {{
        let operation: $crate::Operation = $operation;
        let config: &$crate::BenchConfig = $config;
        let mut group = $c.benchmark_group(operation.label());
        // Every sample reseeds the fixture.
        if operation.reads() {
            group.sample_size(10);
        }

        for strategy in $crate::Strategy::ALL {
            let scenario = $crate::Scenario::new(operation, strategy);
            group.bench_function(strategy.label(), |b| {
                b.to_async($rt).iter_custom(|iters| async move {
                    scenario
                        .run(config, iters)
                        .await
                        .unwrap_or_else(|e| panic!("{scenario}: {e}"))
                });
            });
        }

        group.finish();
    }};
}
