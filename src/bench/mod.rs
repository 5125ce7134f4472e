//! Read and write benchmarks over the imported dataset.
//!
//! Each test is independent and runs against whatever the import phase left
//! in the store. Latency tests time individual store round-trips (execute
//! plus full result consumption) and report percentiles; the write test
//! times one batch submission as a unit.

pub mod concurrency;

pub use concurrency::{ConcurrencyLoadRunner, ConcurrencyOutcome};

use crate::partition::PartitionStrategy;
use crate::report::LatencyPercentiles;
use crate::store::{GraphStore, StoreError, StoreQuery};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use workload_generator::WorkloadGenerator;

/// Iterations for the point-lookup latency test.
pub const READ_LATENCY_SAMPLES: usize = 1000;

/// Iterations for the multi-hop traversal test.
pub const MULTIHOP_SAMPLES: usize = 100;

/// Records submitted by the write-throughput test.
pub const WRITE_TEST_COUNT: u64 = 10_000;

/// Id offset keeping write-test records clear of imported transactions.
pub const WRITE_TEST_ID_OFFSET: i64 = 2_000_000_000;

const POINT_LOOKUP_QUERY: &str = "MATCH (a:Account {id: $aid})<-[:FROM|TO]-(t:Transaction)\n\
     RETURN t.id, t.amount, t.ts\n\
     ORDER BY t.ts DESC LIMIT 20";

const MULTIHOP_QUERY: &str = "MATCH (a:Account {id: $aid})<-[:FROM]-(t1:Transaction)\
     -[:TO]->(b:Account)<-[:FROM]-(t2:Transaction)\n\
     RETURN count(t2)\n\
     LIMIT 100";

const SUPERNODE_QUERY: &str = "MATCH (a:Account {id: $aid})--(t:Transaction)\n\
     RETURN t.id\n\
     LIMIT 5000";

/// Sort samples ascending and pick p50/p90/p99 by index
/// (`sorted[floor(n*K)]`, clamped to the last element). Members of the
/// input set by construction.
pub fn percentiles(samples: &mut [f64]) -> Option<LatencyPercentiles> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_by(|a, b| a.total_cmp(b));
    let n = samples.len();
    let at = |k: f64| samples[((n as f64 * k) as usize).min(n - 1)];
    Some(LatencyPercentiles {
        p50_ms: at(0.5),
        p90_ms: at(0.9),
        p99_ms: at(0.99),
    })
}

/// Single-threaded benchmark driver for the read and write tests.
pub struct BenchmarkRunner {
    store: Arc<dyn GraphStore>,
    strategy: PartitionStrategy,
    num_accounts: u64,
    rng: StdRng,
    generator: WorkloadGenerator,
}

impl BenchmarkRunner {
    pub fn new(
        store: Arc<dyn GraphStore>,
        strategy: PartitionStrategy,
        num_accounts: u64,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let generator = WorkloadGenerator::new(num_accounts, strategy.start_epoch(), seed);
        Self {
            store,
            strategy,
            num_accounts,
            rng,
            generator,
        }
    }

    /// Import one synthetic batch of `count` transactions, timed as a unit.
    /// Returns records per second.
    pub async fn write_throughput(
        &mut self,
        count: u64,
        write_epoch: i64,
    ) -> Result<f64, StoreError> {
        let mut batch = self
            .generator
            .transactions_from(count, count as usize, WRITE_TEST_ID_OFFSET)
            .next()
            .unwrap_or_default();
        let ts = self.strategy.clamp_to_window(write_epoch);
        for tx in &mut batch {
            tx.ts = ts;
        }
        let query = self.strategy.write_test_query(&batch);

        let mut session = self.store.session().await?;
        let start = Instant::now();
        session.run(&query).await?;
        let secs = start.elapsed().as_secs_f64();
        Ok(if secs > 0.0 { count as f64 / secs } else { 0.0 })
    }

    /// Point-lookup latency over `samples` uniformly random accounts:
    /// the 20 most recent transactions touching the account.
    pub async fn read_latency(
        &mut self,
        samples: usize,
    ) -> Result<Option<LatencyPercentiles>, StoreError> {
        self.sample_latency(POINT_LOOKUP_QUERY, samples).await
    }

    /// 3-hop traversal latency (account <- txn -> account <- txn).
    pub async fn multihop_latency(
        &mut self,
        samples: usize,
    ) -> Result<Option<LatencyPercentiles>, StoreError> {
        self.sample_latency(MULTIHOP_QUERY, samples).await
    }

    /// One timed scan of the highest-popularity account (id 0 under the
    /// skew), capped at 5000 related transactions. Milliseconds.
    pub async fn supernode_scan(&mut self) -> Result<f64, StoreError> {
        let query = StoreQuery::new(SUPERNODE_QUERY).param("aid", 0i64);
        let mut session = self.store.session().await?;
        let start = Instant::now();
        session.run(&query).await?;
        Ok(start.elapsed().as_secs_f64() * 1000.0)
    }

    /// One timed count of transactions in the most recent 30 days, using
    /// whichever shape the partition strategy supplies. Milliseconds.
    pub async fn time_range_count(&mut self, now: i64) -> Result<f64, StoreError> {
        let since = now - 30 * 24 * 3600;
        let query = self.strategy.timerange_count_query(since);
        let mut session = self.store.session().await?;
        let start = Instant::now();
        session.count(&query).await?;
        Ok(start.elapsed().as_secs_f64() * 1000.0)
    }

    async fn sample_latency(
        &mut self,
        query_text: &str,
        samples: usize,
    ) -> Result<Option<LatencyPercentiles>, StoreError> {
        let mut session = self.store.session().await?;
        let mut latencies = Vec::with_capacity(samples);
        for _ in 0..samples {
            let aid = self.rng.random_range(0..self.num_accounts.max(1) as i64);
            let query = StoreQuery::new(query_text).param("aid", aid);
            let start = Instant::now();
            session.run(&query).await?;
            latencies.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(percentiles(&mut latencies))
    }
}
