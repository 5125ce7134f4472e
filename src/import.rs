//! Batch import with bounded retry.
//!
//! Each generated batch is pushed to the store as one atomic round-trip.
//! Transient store errors are retried up to a fixed attempt budget with a
//! fixed backoff; anything else aborts the import phase immediately. A batch
//! that exhausts its attempts aborts the phase as well: there is no
//! partial-batch recovery, and a failed run leaves the dataset partially
//! populated.

use crate::partition::PartitionStrategy;
use crate::store::{GraphStore, StoreError, StoreQuery};
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use workload_generator::WorkloadGenerator;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(2);
const PROGRESS_INTERVAL: u64 = 100_000;

/// Timing and volume accounting for one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub accounts_imported: u64,
    pub transactions_imported: u64,
    pub account_secs: f64,
    pub transaction_secs: f64,
    pub total_secs: f64,
}

/// Pushes generated batches into the store, one round-trip per batch.
pub struct BatchImporter {
    store: Arc<dyn GraphStore>,
    strategy: PartitionStrategy,
}

impl BatchImporter {
    pub fn new(store: Arc<dyn GraphStore>, strategy: PartitionStrategy) -> Self {
        Self { store, strategy }
    }

    /// Import one account batch.
    pub async fn import_accounts(
        &self,
        batch: &[workload_generator::Account],
    ) -> anyhow::Result<()> {
        self.run_with_retry(self.strategy.account_import_query(batch))
            .await
    }

    /// Import one transaction batch; the strategy supplies any partition
    /// keys the schema needs.
    pub async fn import_transactions(
        &self,
        batch: &[workload_generator::Transaction],
    ) -> anyhow::Result<()> {
        self.run_with_retry(self.strategy.transaction_import_query(batch))
            .await
    }

    /// Run the full sequential import: all accounts, then all transactions.
    pub async fn run(
        &self,
        generator: &mut WorkloadGenerator,
        accounts: u64,
        transactions: u64,
        batch_size: usize,
    ) -> anyhow::Result<ImportOutcome> {
        let import_start = Instant::now();
        let mut outcome = ImportOutcome::default();

        tracing::info!("Importing {accounts} accounts...");
        let phase_start = Instant::now();
        for batch in generator.accounts(accounts, batch_size) {
            self.import_accounts(&batch).await?;
            outcome.accounts_imported =
                log_progress("accounts", outcome.accounts_imported, batch.len() as u64);
        }
        outcome.account_secs = phase_start.elapsed().as_secs_f64();
        tracing::info!("Accounts imported in {:.2}s", outcome.account_secs);

        tracing::info!("Importing {transactions} transactions...");
        let phase_start = Instant::now();
        for batch in generator.transactions(transactions, batch_size) {
            self.import_transactions(&batch).await?;
            outcome.transactions_imported = log_progress(
                "transactions",
                outcome.transactions_imported,
                batch.len() as u64,
            );
        }
        outcome.transaction_secs = phase_start.elapsed().as_secs_f64();

        outcome.total_secs = import_start.elapsed().as_secs_f64();
        tracing::info!("Import complete. Total time: {:.2}s", outcome.total_secs);
        Ok(outcome)
    }

    /// Submit one query with the bounded retry policy: up to `MAX_ATTEMPTS`
    /// attempts, a fixed backoff between transient failures, no sleep after
    /// the final attempt or after success.
    async fn run_with_retry(&self, query: StoreQuery) -> anyhow::Result<()> {
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(&query).await {
                Ok(()) => {
                    if attempt > 1 {
                        tracing::info!("Batch import succeeded on attempt {attempt}");
                    }
                    return Ok(());
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(
                        "Transient store error on attempt {attempt}/{MAX_ATTEMPTS}: {e}"
                    );
                    last_error = Some(e);
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    }
                }
                Err(e) => {
                    return Err(e).context("batch import failed with a non-retryable error");
                }
            }
        }

        Err(last_error.unwrap())
            .context(format!("batch import failed after {MAX_ATTEMPTS} attempts"))
    }

    async fn attempt(&self, query: &StoreQuery) -> Result<(), StoreError> {
        let mut session = self.store.session().await?;
        session.run(query).await
    }
}

fn log_progress(what: &str, imported_so_far: u64, batch_len: u64) -> u64 {
    let total = imported_so_far + batch_len;
    if total / PROGRESS_INTERVAL > imported_so_far / PROGRESS_INTERVAL {
        tracing::info!("  Imported {total} {what}...");
    } else {
        tracing::debug!("  Imported {total} {what}...");
    }
    total
}
