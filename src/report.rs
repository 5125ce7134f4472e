//! Final benchmark report assembly.
//!
//! Pure composition of the run's measurements into one serializable record.
//! Sections that did not run (dry-run mode) serialize as empty objects so a
//! report always carries the same top-level shape.

use crate::import::ImportOutcome;
use crate::partition::{PartitionStrategy, SchemaVariant};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use system_monitor::SystemMetrics;

/// Dataset dimensions for one size preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetConfig {
    pub accounts: u64,
    pub transactions: u64,
}

/// Import-phase throughput. Empty on a dry run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_per_sec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships_per_sec: Option<f64>,
}

impl ImportStats {
    /// Derive throughput from the import accounting; a zero-duration phase
    /// reports zero throughput rather than dividing by zero.
    pub fn from_outcome(outcome: &ImportOutcome, strategy: &PartitionStrategy) -> Self {
        let nodes_per_sec = if outcome.account_secs > 0.0 {
            outcome.accounts_imported as f64 / outcome.account_secs
        } else {
            0.0
        };
        let relationships = outcome.transactions_imported
            * strategy.relationships_per_transaction();
        let relationships_per_sec = if outcome.transaction_secs > 0.0 {
            relationships as f64 / outcome.transaction_secs
        } else {
            0.0
        };
        Self {
            duration_seconds: Some(round2(outcome.total_secs)),
            nodes_per_sec: Some(round2(nodes_per_sec)),
            relationships_per_sec: Some(round2(relationships_per_sec)),
        }
    }
}

/// Latency distribution of a sampled read test, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyPercentiles {
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p99_ms: f64,
}

impl LatencyPercentiles {
    pub fn rounded(self) -> Self {
        Self {
            p50_ms: round2(self.p50_ms),
            p90_ms: round2(self.p90_ms),
            p99_ms: round2(self.p99_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WriteStats {
    /// Records per second for the one-shot write batch.
    pub tps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SingleLatency {
    pub latency_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConcurrencyStats {
    pub ops_per_sec: f64,
    pub errors: u64,
}

/// All benchmark sections. Every field is optional so a partial or skipped
/// benchmark phase still serializes cleanly.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BenchmarkResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writes: Option<WriteStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reads: Option<LatencyPercentiles>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traversal: Option<LatencyPercentiles>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supernode: Option<SingleLatency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<SingleLatency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<ConcurrencyStats>,
}

/// The complete run record written to the output path.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub size: String,
    pub schema_variant: SchemaVariant,
    pub config: DatasetConfig,
    pub import: ImportStats,
    pub benchmarks: BenchmarkResults,
    pub system_metrics: SystemMetrics,
}

/// Serialize the report as pretty JSON to `path`.
pub fn write_report(report: &BenchReport, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, &json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    tracing::info!("Results written to {}", path.display());
    Ok(())
}

/// Round to 2 decimal places for report output.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
