//! Concurrent read throughput.
//!
//! Spawns a fixed pool of workers, each owning one store session and one
//! RNG, issuing trivial point lookups until the deadline. Cancellation is
//! cooperative: the token is checked between round-trips and an in-flight
//! call is allowed to finish, so a slow call can overrun the nominal
//! duration. Per-call errors are tallied, never propagated. Each worker
//! keeps local counters that are merged when it joins.

use crate::store::{GraphStore, StoreQuery};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const WORKER_LOOKUP_QUERY: &str = "MATCH (a:Account {id: $aid}) RETURN a.name";

/// Aggregated result of one concurrency run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConcurrencyOutcome {
    pub total_ops: u64,
    pub total_errors: u64,
    /// Successful operations divided by the requested duration.
    pub ops_per_sec: f64,
    /// Wall-clock time from spawn to last join.
    pub elapsed: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
struct WorkerTally {
    ops: u64,
    errors: u64,
}

/// Fixed-size worker pool driving point lookups until a deadline.
pub struct ConcurrencyLoadRunner {
    store: Arc<dyn GraphStore>,
    num_accounts: u64,
}

impl ConcurrencyLoadRunner {
    pub fn new(store: Arc<dyn GraphStore>, num_accounts: u64) -> Self {
        Self {
            store,
            num_accounts,
        }
    }

    /// Run `workers` parallel workers for `duration`, then wait for all of
    /// them to finish before aggregating.
    pub async fn run(&self, workers: usize, duration: Duration) -> ConcurrencyOutcome {
        tracing::info!(
            "Starting concurrency test: {workers} workers for {:.1}s",
            duration.as_secs_f64()
        );
        let start = Instant::now();
        let token = CancellationToken::new();

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let store = Arc::clone(&self.store);
            let token = token.clone();
            let num_accounts = self.num_accounts;
            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, store, num_accounts, token).await
            }));
        }

        tokio::time::sleep(duration).await;
        token.cancel();

        let mut total_ops = 0u64;
        let mut total_errors = 0u64;
        for (worker_id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(tally) => {
                    total_ops += tally.ops;
                    total_errors += tally.errors;
                }
                Err(e) => {
                    tracing::error!("Worker {worker_id} task error: {e}");
                    total_errors += 1;
                }
            }
        }

        let elapsed = start.elapsed();
        let ops_per_sec = total_ops as f64 / duration.as_secs_f64();
        tracing::info!(
            "Concurrency test finished: {total_ops} ops, {total_errors} errors, \
             {ops_per_sec:.2} ops/sec"
        );
        ConcurrencyOutcome {
            total_ops,
            total_errors,
            ops_per_sec,
            elapsed,
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    store: Arc<dyn GraphStore>,
    num_accounts: u64,
    token: CancellationToken,
) -> WorkerTally {
    let mut tally = WorkerTally::default();

    let mut session = match store.session().await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Worker {worker_id} failed to open a session: {e}");
            tally.errors += 1;
            return tally;
        }
    };
    let mut rng = StdRng::from_os_rng();

    while !token.is_cancelled() {
        let aid = rng.random_range(0..num_accounts.max(1) as i64);
        let query = StoreQuery::new(WORKER_LOOKUP_QUERY).param("aid", aid);
        match session.run(&query).await {
            Ok(()) => tally.ops += 1,
            Err(e) => {
                tally.errors += 1;
                tracing::debug!("Worker {worker_id} lookup failed: {e}");
            }
        }
    }

    tally
}
