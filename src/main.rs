//! Command-line interface for graph-bench
//!
//! # Usage Examples
//!
//! ```bash
//! # Flat schema, smallest preset
//! graph-bench --size xs --schema flat \
//!   --neo4j-uri bolt://localhost:7687 \
//!   --neo4j-password secret \
//!   --out results.json
//!
//! # Temporal partitioning with a deterministic workload
//! graph-bench --size sm --schema temporal --seed 42 \
//!   --neo4j-uri bolt://neo4j.internal:7687 \
//!   --neo4j-password secret \
//!   --batch-size 10000 --concurrency 20 \
//!   --out results-temporal.json
//!
//! # Dry run: no import, no benchmarks, system metrics only
//! graph-bench --size xs --dry-run --neo4j-password secret --out dry.json
//! ```

use chrono::Utc;
use clap::{Parser, ValueEnum};
use graph_bench::bench::{BenchmarkRunner, ConcurrencyLoadRunner, WRITE_TEST_COUNT};
use graph_bench::import::BatchImporter;
use graph_bench::partition::{PartitionStrategy, SchemaVariant};
use graph_bench::report::{
    round2, BenchReport, BenchmarkResults, ConcurrencyStats, DatasetConfig, ImportStats,
    SingleLatency, WriteStats,
};
use graph_bench::store::{GraphStore, Neo4jStore};
use graph_bench::{Neo4jOpts, WorkloadGenerator, YEAR_SECONDS};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use system_monitor::ResourceMonitor;
use tracing::info;

#[derive(Parser)]
#[command(name = "graph-bench")]
#[command(about = "Scalability benchmark for account/transaction graph workloads on Neo4j")]
#[command(long_about = None)]
struct Cli {
    /// Dataset size preset
    #[arg(long, value_enum)]
    size: SizePreset,

    /// Schema variant under test
    #[arg(long, value_enum, default_value = "flat")]
    schema: SchemaVariant,

    /// Neo4j connection options
    #[command(flatten)]
    neo4j: Neo4jOpts,

    /// Output JSON report path
    #[arg(long)]
    out: PathBuf,

    /// Records per import batch
    #[arg(long, default_value = "5000")]
    batch_size: usize,

    /// Parallel workers for the concurrency test
    #[arg(long, default_value = "10")]
    concurrency: usize,

    /// Concurrency test duration in seconds
    #[arg(long, default_value = "10")]
    duration_secs: u64,

    /// Samples per read-latency test
    #[arg(long, default_value_t = graph_bench::bench::READ_LATENCY_SAMPLES)]
    samples: usize,

    /// Skip import and benchmarks; capture system metrics only
    #[arg(long)]
    dry_run: bool,

    /// Seed for deterministic workload generation
    #[arg(long)]
    seed: Option<u64>,
}

/// Dataset size presets (accounts / transactions).
#[derive(Clone, Copy, Debug, ValueEnum)]
enum SizePreset {
    /// 100k accounts, 1M transactions
    Xs,
    /// 1M accounts, 10M transactions
    Sm,
    /// 5M accounts, 50M transactions
    Md,
    /// 10M accounts, 200M transactions
    Lg,
    /// 30M accounts, 1.2B transactions
    Full,
}

impl SizePreset {
    fn config(&self) -> DatasetConfig {
        let (accounts, transactions) = match self {
            SizePreset::Xs => (100_000, 1_000_000),
            SizePreset::Sm => (1_000_000, 10_000_000),
            SizePreset::Md => (5_000_000, 50_000_000),
            SizePreset::Lg => (10_000_000, 200_000_000),
            SizePreset::Full => (30_000_000, 1_200_000_000),
        };
        DatasetConfig {
            accounts,
            transactions,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            SizePreset::Xs => "xs",
            SizePreset::Sm => "sm",
            SizePreset::Md => "md",
            SizePreset::Lg => "lg",
            SizePreset::Full => "full",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.size.config();
    info!(
        "Configuration: {} ({} accounts, {} transactions), schema: {:?}",
        cli.size.as_str().to_uppercase(),
        config.accounts,
        config.transactions,
        cli.schema
    );

    let mut monitor = ResourceMonitor::start();
    let store: Arc<dyn GraphStore> = Arc::new(Neo4jStore::connect(&cli.neo4j)?);

    let now = Utc::now().timestamp();
    let start_epoch = now - YEAR_SECONDS;
    let strategy = PartitionStrategy::new(cli.schema, start_epoch);

    let mut import = ImportStats::default();
    let mut benchmarks = BenchmarkResults::default();

    if cli.dry_run {
        info!("Dry run selected. Skipping import and benchmarks.");
    } else {
        info!("--- Starting import ---");
        strategy.setup(store.as_ref()).await?;

        let mut generator = WorkloadGenerator::new(config.accounts, start_epoch, cli.seed);
        let importer = BatchImporter::new(Arc::clone(&store), strategy);
        let outcome = importer
            .run(
                &mut generator,
                config.accounts,
                config.transactions,
                cli.batch_size,
            )
            .await?;
        import = ImportStats::from_outcome(&outcome, &strategy);

        info!("--- Starting benchmarks ---");
        let mut bench =
            BenchmarkRunner::new(Arc::clone(&store), strategy, config.accounts, cli.seed);

        info!("Running write test...");
        let tps = bench.write_throughput(WRITE_TEST_COUNT, now).await?;
        benchmarks.writes = Some(WriteStats { tps: round2(tps) });

        info!("Running read latency test...");
        benchmarks.reads = bench
            .read_latency(cli.samples)
            .await?
            .map(|p| p.rounded());

        info!("Running multi-hop test...");
        benchmarks.traversal = bench
            .multihop_latency(graph_bench::bench::MULTIHOP_SAMPLES)
            .await?
            .map(|p| p.rounded());

        info!("Running supernode test...");
        benchmarks.supernode = Some(SingleLatency {
            latency_ms: round2(bench.supernode_scan().await?),
        });

        info!("Running time-range test...");
        benchmarks.time_range = Some(SingleLatency {
            latency_ms: round2(bench.time_range_count(now).await?),
        });

        info!("Running concurrency test...");
        let runner = ConcurrencyLoadRunner::new(Arc::clone(&store), config.accounts);
        let outcome = runner
            .run(cli.concurrency, Duration::from_secs(cli.duration_secs))
            .await;
        benchmarks.concurrency = Some(ConcurrencyStats {
            ops_per_sec: round2(outcome.ops_per_sec),
            errors: outcome.total_errors,
        });
    }

    let report = BenchReport {
        size: cli.size.as_str().to_string(),
        schema_variant: cli.schema,
        config,
        import,
        benchmarks,
        system_metrics: monitor.metrics(),
    };
    graph_bench::report::write_report(&report, &cli.out)?;

    Ok(())
}
