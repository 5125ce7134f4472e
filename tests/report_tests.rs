//! Report shape and serialization.

use graph_bench::partition::SchemaVariant;
use graph_bench::report::{
    write_report, BenchReport, BenchmarkResults, ConcurrencyStats, DatasetConfig, ImportStats,
    LatencyPercentiles, SingleLatency, WriteStats,
};
use system_monitor::{derive_metrics, Snapshot};

fn metrics() -> system_monitor::SystemMetrics {
    let start = Snapshot {
        taken_at_secs: 0.0,
        cpu: Some(system_monitor::CpuTimes {
            total: 1000.0,
            idle: 900.0,
        }),
        disk: Some(system_monitor::DiskCounters {
            read_bytes: 0,
            written_bytes: 0,
        }),
        mem: Some(system_monitor::MemInfo {
            total_kb: 8 * 1024 * 1024,
            used_kb: 2 * 1024 * 1024,
        }),
    };
    let end = Snapshot {
        taken_at_secs: 10.0,
        cpu: Some(system_monitor::CpuTimes {
            total: 2000.0,
            idle: 1400.0,
        }),
        disk: Some(system_monitor::DiskCounters {
            read_bytes: 1024 * 1024,
            written_bytes: 2 * 1024 * 1024,
        }),
        mem: Some(system_monitor::MemInfo {
            total_kb: 8 * 1024 * 1024,
            used_kb: 3 * 1024 * 1024,
        }),
    };
    derive_metrics(&start, &end)
}

fn dry_run_report() -> BenchReport {
    BenchReport {
        size: "xs".to_string(),
        schema_variant: SchemaVariant::Flat,
        config: DatasetConfig {
            accounts: 100_000,
            transactions: 1_000_000,
        },
        import: ImportStats::default(),
        benchmarks: BenchmarkResults::default(),
        system_metrics: metrics(),
    }
}

#[test]
fn test_dry_run_report_has_empty_sections_and_populated_metrics() {
    let json = serde_json::to_value(dry_run_report()).unwrap();

    assert_eq!(json["import"], serde_json::json!({}));
    assert_eq!(json["benchmarks"], serde_json::json!({}));
    assert_eq!(json["size"], "xs");
    assert_eq!(json["schema_variant"], "flat");
    assert_eq!(json["config"]["accounts"], 100_000);

    let metrics = &json["system_metrics"];
    assert_eq!(metrics["cpu_load_percent"], 50.0);
    assert_eq!(metrics["memory_used_gb"], 3.0);
    assert_eq!(metrics["disk_read_mb_s"], 0.1);
    assert_eq!(metrics["disk_write_mb_s"], 0.2);
    assert_eq!(metrics["degraded"], false);
}

#[test]
fn test_full_report_carries_all_benchmark_sections() {
    let mut report = dry_run_report();
    report.schema_variant = SchemaVariant::Temporal;
    report.import = ImportStats {
        duration_seconds: Some(120.5),
        nodes_per_sec: Some(830.0),
        relationships_per_sec: Some(24_900.0),
    };
    report.benchmarks = BenchmarkResults {
        writes: Some(WriteStats { tps: 5120.33 }),
        reads: Some(LatencyPercentiles {
            p50_ms: 1.2,
            p90_ms: 3.4,
            p99_ms: 9.9,
        }),
        traversal: Some(LatencyPercentiles {
            p50_ms: 10.0,
            p90_ms: 20.0,
            p99_ms: 45.0,
        }),
        supernode: Some(SingleLatency { latency_ms: 88.1 }),
        time_range: Some(SingleLatency { latency_ms: 12.7 }),
        concurrency: Some(ConcurrencyStats {
            ops_per_sec: 950.25,
            errors: 0,
        }),
    };

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["schema_variant"], "temporal");
    assert_eq!(json["import"]["nodes_per_sec"], 830.0);
    assert_eq!(json["benchmarks"]["writes"]["tps"], 5120.33);
    assert_eq!(json["benchmarks"]["reads"]["p50_ms"], 1.2);
    assert_eq!(json["benchmarks"]["traversal"]["p99_ms"], 45.0);
    assert_eq!(json["benchmarks"]["supernode"]["latency_ms"], 88.1);
    assert_eq!(json["benchmarks"]["time_range"]["latency_ms"], 12.7);
    assert_eq!(json["benchmarks"]["concurrency"]["ops_per_sec"], 950.25);
}

#[test]
fn test_write_report_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");

    write_report(&dry_run_report(), &path).expect("report written");

    let content = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["size"], "xs");
    assert_eq!(json["import"], serde_json::json!({}));
}
