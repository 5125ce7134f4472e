//! Benchmark runner behavior against a scripted store.

use graph_bench::bench::{BenchmarkRunner, WRITE_TEST_ID_OFFSET};
use graph_bench::partition::{PartitionStrategy, SchemaVariant};
use graph_bench::store::{GraphStore, ParamValue};
use graph_bench::testing::{MockOutcome, MockStore};
use std::sync::Arc;

const EPOCH: i64 = 1_704_067_200;

fn runner_with(mock: &MockStore, variant: SchemaVariant, accounts: u64) -> BenchmarkRunner {
    let store: Arc<dyn GraphStore> = Arc::new(mock.clone());
    BenchmarkRunner::new(store, PartitionStrategy::new(variant, EPOCH), accounts, Some(11))
}

#[tokio::test]
async fn test_write_throughput_submits_one_offset_batch() {
    let mock = MockStore::new();
    let mut runner = runner_with(&mock, SchemaVariant::Flat, 100);

    let now = EPOCH + graph_bench::YEAR_SECONDS;
    let tps = runner.write_throughput(500, now).await.expect("write test");

    assert!(tps > 0.0);
    let queries = mock.queries();
    assert_eq!(queries.len(), 1);
    let text = &queries[0].text;
    // Reduced-property create with ids clear of imported data.
    assert!(text.contains("CREATE (t:Transaction {id: row.id, ts: row.ts})"));
    assert!(text.contains(&format!("id: {WRITE_TEST_ID_OFFSET}")));
    assert!(!text.contains("currency"));
}

#[tokio::test]
async fn test_read_latency_samples_and_reports_percentiles() {
    let mock = MockStore::new();
    let mut runner = runner_with(&mock, SchemaVariant::Flat, 100);

    let percentiles = runner
        .read_latency(50)
        .await
        .expect("latency test")
        .expect("non-empty samples");

    assert_eq!(mock.query_count(), 50);
    assert!(percentiles.p50_ms <= percentiles.p90_ms);
    assert!(percentiles.p90_ms <= percentiles.p99_ms);

    for query in mock.queries() {
        assert!(query.text.contains("ORDER BY t.ts DESC LIMIT 20"));
        match &query.params[0] {
            (_, ParamValue::Int(aid)) => assert!((0..100).contains(aid)),
            other => panic!("unexpected param {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_zero_samples_yield_no_percentiles() {
    let mock = MockStore::new();
    let mut runner = runner_with(&mock, SchemaVariant::Flat, 100);
    assert!(runner.read_latency(0).await.expect("runs").is_none());
    assert_eq!(mock.query_count(), 0);
}

#[tokio::test]
async fn test_supernode_scan_targets_account_zero() {
    let mock = MockStore::new();
    let mut runner = runner_with(&mock, SchemaVariant::Flat, 100);

    let latency_ms = runner.supernode_scan().await.expect("supernode test");
    assert!(latency_ms >= 0.0);

    let queries = mock.queries();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].text.contains("LIMIT 5000"));
    assert_eq!(queries[0].params[0], ("aid".to_string(), ParamValue::Int(0)));
}

#[tokio::test]
async fn test_time_range_count_uses_strategy_shape() {
    let now = EPOCH + graph_bench::YEAR_SECONDS;

    let mock = MockStore::with_script([MockOutcome::Count(1234)]);
    let mut runner = runner_with(&mock, SchemaVariant::Flat, 100);
    runner.time_range_count(now).await.expect("time-range test");
    assert!(mock.queries()[0].text.starts_with("MATCH (t:Transaction)"));

    let mock = MockStore::with_script([MockOutcome::Count(1234)]);
    let mut runner = runner_with(&mock, SchemaVariant::Temporal, 100);
    runner.time_range_count(now).await.expect("time-range test");
    let query = &mock.queries()[0];
    assert!(query.text.starts_with("MATCH (d:Day)-[:CONTAINS]->(t:Transaction)"));
    // Window: the most recent 30 days.
    assert_eq!(
        query.params[0],
        ("since".to_string(), ParamValue::Int(now - 30 * 24 * 3600))
    );
}

#[tokio::test]
async fn test_multihop_uses_three_hop_pattern() {
    let mock = MockStore::new();
    let mut runner = runner_with(&mock, SchemaVariant::Flat, 100);

    runner.multihop_latency(10).await.expect("multihop test");

    assert_eq!(mock.query_count(), 10);
    let text = &mock.queries()[0].text;
    assert!(text.contains("<-[:FROM]-(t1:Transaction)"));
    assert!(text.contains("<-[:FROM]-(t2:Transaction)"));
    assert!(text.contains("LIMIT 100"));
}
