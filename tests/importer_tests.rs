//! Importer retry semantics against a scripted store.

use graph_bench::import::BatchImporter;
use graph_bench::partition::{PartitionStrategy, SchemaVariant};
use graph_bench::store::GraphStore;
use graph_bench::testing::{MockOutcome, MockStore};
use graph_bench::WorkloadGenerator;
use std::sync::Arc;
use std::time::Duration;

const EPOCH: i64 = 1_704_067_200;

fn importer_with(mock: &MockStore, variant: SchemaVariant) -> BatchImporter {
    let store: Arc<dyn GraphStore> = Arc::new(mock.clone());
    BatchImporter::new(store, PartitionStrategy::new(variant, EPOCH))
}

fn account_batch(count: u64) -> Vec<workload_generator::Account> {
    let mut generator = WorkloadGenerator::new(100, EPOCH, Some(1));
    generator.accounts(count, count as usize).next().unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_three_transient_failures_escalate_after_three_attempts() {
    let mock = MockStore::with_script([
        MockOutcome::Transient,
        MockOutcome::Transient,
        MockOutcome::Transient,
    ]);
    let importer = importer_with(&mock, SchemaVariant::Flat);

    let before = tokio::time::Instant::now();
    let err = importer
        .import_accounts(&account_batch(5))
        .await
        .expect_err("exhausted retries must fail");
    let waited = before.elapsed();

    // Exactly 3 attempts, no 4th.
    assert_eq!(mock.query_count(), 3);
    // 2s backoff after each of the first two failures, none after the last.
    assert!(waited >= Duration::from_secs(4), "waited {waited:?}");
    assert!(waited < Duration::from_millis(4100), "waited {waited:?}");
    assert!(format!("{err:#}").contains("after 3 attempts"));
}

#[tokio::test(start_paused = true)]
async fn test_success_on_second_attempt_does_not_sleep_after_success() {
    let mock = MockStore::with_script([MockOutcome::Transient, MockOutcome::Ok]);
    let importer = importer_with(&mock, SchemaVariant::Flat);

    let before = tokio::time::Instant::now();
    importer
        .import_accounts(&account_batch(5))
        .await
        .expect("second attempt succeeds");
    let waited = before.elapsed();

    assert_eq!(mock.query_count(), 2);
    // One backoff only.
    assert!(waited >= Duration::from_secs(2), "waited {waited:?}");
    assert!(waited < Duration::from_millis(2100), "waited {waited:?}");
}

#[tokio::test(start_paused = true)]
async fn test_fatal_error_is_not_retried() {
    let mock = MockStore::with_script([MockOutcome::Fatal]);
    let importer = importer_with(&mock, SchemaVariant::Flat);

    let before = tokio::time::Instant::now();
    let err = importer
        .import_accounts(&account_batch(5))
        .await
        .expect_err("fatal error propagates");

    assert_eq!(mock.query_count(), 1);
    // No backoff was taken.
    assert_eq!(before.elapsed(), Duration::ZERO);
    assert!(format!("{err:#}").contains("non-retryable"));
}

#[tokio::test(start_paused = true)]
async fn test_fatal_error_after_transient_stops_retrying() {
    let mock = MockStore::with_script([MockOutcome::Transient, MockOutcome::Fatal]);
    let importer = importer_with(&mock, SchemaVariant::Flat);

    let err = importer
        .import_accounts(&account_batch(5))
        .await
        .expect_err("fatal error propagates");

    assert_eq!(mock.query_count(), 2);
    assert!(format!("{err:#}").contains("non-retryable"));
}

#[tokio::test]
async fn test_run_pushes_one_query_per_batch_and_counts_records() {
    let mock = MockStore::new();
    let importer = importer_with(&mock, SchemaVariant::Flat);
    let mut generator = WorkloadGenerator::new(100, EPOCH, Some(7));

    let outcome = importer
        .run(&mut generator, 12, 25, 10)
        .await
        .expect("all batches succeed");

    assert_eq!(outcome.accounts_imported, 12);
    assert_eq!(outcome.transactions_imported, 25);

    // 12 accounts in batches of 10 -> 2 queries; 25 transactions -> 3.
    let queries = mock.queries();
    assert_eq!(queries.len(), 5);
    for query in &queries[..2] {
        assert!(query.text.starts_with("UNWIND ["));
        assert!(query.text.contains("CREATE (a:Account"));
    }
    for query in &queries[2..] {
        assert!(query.text.contains("CREATE (t:Transaction"));
        assert!(query.text.contains("CREATE (t)-[:FROM]->(from)"));
    }
}

#[tokio::test]
async fn test_temporal_run_links_day_buckets() {
    let mock = MockStore::new();
    let importer = importer_with(&mock, SchemaVariant::Temporal);
    let mut generator = WorkloadGenerator::new(10, EPOCH, Some(3));

    importer
        .run(&mut generator, 5, 5, 5)
        .await
        .expect("import succeeds");

    let queries = mock.queries();
    let transaction_query = queries.last().unwrap();
    assert!(transaction_query.text.contains("MATCH (d:Day {key: row.day_key})"));
    assert!(transaction_query.text.contains("CREATE (d)-[:CONTAINS]->(t)"));
}

#[tokio::test]
async fn test_setup_creates_indexes_per_variant() {
    let mock = MockStore::new();
    let store: Arc<dyn GraphStore> = Arc::new(mock.clone());

    PartitionStrategy::new(SchemaVariant::Flat, EPOCH)
        .setup(store.as_ref())
        .await
        .expect("setup succeeds");
    assert_eq!(mock.created_indexes(), vec!["account_id", "txn_id", "txn_ts"]);
    // Flat setup issues no hierarchy queries.
    assert_eq!(mock.query_count(), 0);

    let mock = MockStore::new();
    let store: Arc<dyn GraphStore> = Arc::new(mock.clone());
    PartitionStrategy::new(SchemaVariant::Temporal, EPOCH)
        .setup(store.as_ref())
        .await
        .expect("setup succeeds");
    assert_eq!(
        mock.created_indexes(),
        vec!["account_id", "txn_id", "txn_ts", "month_key", "day_key"]
    );
    // One months batch and one days batch.
    let queries = mock.queries();
    assert_eq!(queries.len(), 2);
    assert!(queries[0].text.contains("MERGE (mo:Month {key: m.key})"));
    assert!(queries[1].text.contains("MERGE (m)-[:CONTAINS]->(day)"));
}
