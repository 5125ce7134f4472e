//! Concurrency load runner behavior against a scripted store.

use graph_bench::bench::ConcurrencyLoadRunner;
use graph_bench::store::{GraphStore, ParamValue};
use graph_bench::testing::{MockOutcome, MockStore};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_merged_tallies_match_store_calls_and_duration_is_honored() {
    let mock = MockStore::with_op_delay(Duration::from_millis(2));
    let store: Arc<dyn GraphStore> = Arc::new(mock.clone());
    let runner = ConcurrencyLoadRunner::new(store, 100);

    let duration = Duration::from_millis(300);
    let start = Instant::now();
    let outcome = runner.run(4, duration).await;
    let elapsed = start.elapsed();

    assert!(outcome.total_ops > 0, "workers should complete lookups");
    assert_eq!(outcome.total_errors, 0);
    // The merged per-worker tallies account for every store call made.
    assert_eq!(
        outcome.total_ops + outcome.total_errors,
        mock.query_count() as u64
    );
    // Cooperative stop: the run takes at least the requested duration and
    // only overruns by in-flight calls and join time.
    assert!(elapsed >= duration, "elapsed {elapsed:?}");
    assert!(elapsed < duration + Duration::from_millis(700), "elapsed {elapsed:?}");
    assert!(outcome.elapsed >= duration);

    let expected = outcome.total_ops as f64 / duration.as_secs_f64();
    assert!((outcome.ops_per_sec - expected).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_per_call_errors_are_counted_not_propagated() {
    let mock = MockStore::with_script([
        MockOutcome::Fatal,
        MockOutcome::Transient,
        MockOutcome::Fatal,
    ]);
    let store: Arc<dyn GraphStore> = Arc::new(mock.clone());
    let runner = ConcurrencyLoadRunner::new(store, 50);

    let outcome = runner.run(2, Duration::from_millis(150)).await;

    // All three scripted failures were absorbed; the run kept going.
    assert_eq!(outcome.total_errors, 3);
    assert!(outcome.total_ops > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_workers_issue_point_lookups_with_in_range_ids() {
    let mock = MockStore::new();
    let store: Arc<dyn GraphStore> = Arc::new(mock.clone());
    let runner = ConcurrencyLoadRunner::new(store, 100);

    runner.run(2, Duration::from_millis(100)).await;

    let queries = mock.queries();
    assert!(!queries.is_empty());
    for query in &queries {
        assert!(query.text.contains("RETURN a.name"));
        assert_eq!(query.params.len(), 1);
        match &query.params[0] {
            (key, ParamValue::Int(aid)) => {
                assert_eq!(key, "aid");
                assert!((0..100).contains(aid), "aid {aid} out of range");
            }
            other => panic!("unexpected param {other:?}"),
        }
    }
}
