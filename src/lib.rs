//! graph-bench library
//!
//! A benchmark harness that imports a skewed synthetic account/transaction
//! graph into Neo4j and measures import throughput, read-latency
//! percentiles, concurrent-read throughput, and host resource consumption.
//!
//! # Components
//!
//! - [`workload_generator`] - lazy skewed workload batches (member crate)
//! - [`system_monitor`] - /proc resource deltas (member crate)
//! - [`store`] - the store capability and its Neo4j implementation
//! - [`partition`] - flat vs temporally-bucketed schema strategies
//! - [`import`] - batch import with bounded retry
//! - [`bench`] - latency/throughput benchmarks and the concurrency runner
//! - [`report`] - final JSON report assembly
//!
//! # CLI Usage
//!
//! ```bash
//! # Import the xs preset into a flat schema and run every benchmark
//! graph-bench --size xs --schema flat \
//!   --neo4j-uri bolt://localhost:7687 --neo4j-password secret \
//!   --out results.json
//!
//! # Same dataset with temporal partitioning, deterministic workload
//! graph-bench --size xs --schema temporal --seed 42 \
//!   --neo4j-uri bolt://localhost:7687 --neo4j-password secret \
//!   --out results-temporal.json
//!
//! # Resource monitoring only, no import or benchmarks
//! graph-bench --size xs --dry-run --neo4j-password secret --out dry.json
//! ```

use clap::Parser;

pub mod bench;
pub mod import;
pub mod partition;
pub mod report;
pub mod store;
pub mod testing;

pub use workload_generator::{WorkloadGenerator, YEAR_SECONDS};

/// Neo4j connection options.
#[derive(Parser, Clone, Debug)]
pub struct Neo4jOpts {
    /// Neo4j Bolt URI
    #[arg(long, default_value = "bolt://localhost:7687", env = "NEO4J_URI")]
    pub neo4j_uri: String,

    /// Neo4j username
    #[arg(long, default_value = "neo4j", env = "NEO4J_USERNAME")]
    pub neo4j_username: String,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD")]
    pub neo4j_password: String,

    /// Neo4j database name
    #[arg(long, default_value = "neo4j", env = "NEO4J_DATABASE")]
    pub neo4j_database: String,
}
