//! Pluggable transaction partitioning.
//!
//! The flat variant stores transactions directly against their accounts; the
//! temporal variant additionally links each transaction into a
//! Month -> Day bucket hierarchy covering the 365-day workload window, which
//! lets time-range queries traverse buckets instead of scanning every
//! transaction. Generator, importer, and benchmarks all dispatch on the
//! strategy rather than duplicating the harness per schema.

use crate::store::cypher::{escape_str, list_literal, map_literal};
use crate::store::{GraphStore, StoreError, StoreQuery};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use workload_generator::{Account, Transaction, YEAR_SECONDS};

/// Schema variant under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// Transactions hang off accounts only; time-range queries scan by
    /// timestamp predicate.
    Flat,
    /// Transactions are additionally bucketed into a Month/Day hierarchy.
    Temporal,
}

/// Bucket keys for one transaction timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketKeys {
    pub month_key: String,
    pub day_key: String,
}

/// One day of the bucket calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub day_key: String,
    pub month_key: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Partitioning policy for one benchmark run, fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct PartitionStrategy {
    variant: SchemaVariant,
    start_epoch: i64,
}

impl PartitionStrategy {
    pub fn new(variant: SchemaVariant, start_epoch: i64) -> Self {
        Self {
            variant,
            start_epoch,
        }
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    pub fn start_epoch(&self) -> i64 {
        self.start_epoch
    }

    /// Relationships created per imported transaction: FROM and TO edges,
    /// plus the Day link under the temporal variant.
    pub fn relationships_per_transaction(&self) -> u64 {
        match self.variant {
            SchemaVariant::Flat => 2,
            SchemaVariant::Temporal => 3,
        }
    }

    /// Idempotently create the indexes and, for the temporal variant, the
    /// Month/Day hierarchy the import path expects.
    pub async fn setup(&self, store: &dyn GraphStore) -> Result<(), StoreError> {
        tracing::info!("Creating indexes...");
        store.create_index("account_id", "Account", "id").await?;
        store.create_index("txn_id", "Transaction", "id").await?;
        store.create_index("txn_ts", "Transaction", "ts").await?;

        if self.variant == SchemaVariant::Temporal {
            store.create_index("month_key", "Month", "key").await?;
            store.create_index("day_key", "Day", "key").await?;
            self.create_bucket_hierarchy(store).await?;
        }
        Ok(())
    }

    /// The bucket keys for `ts`, or `None` under the flat variant.
    pub fn annotate(&self, ts: i64) -> Option<BucketKeys> {
        match self.variant {
            SchemaVariant::Flat => None,
            SchemaVariant::Temporal => Some(bucket_keys(ts)),
        }
    }

    /// Clamp a timestamp into the 365-day bucket calendar so synthetic
    /// write-test records always find their Day node.
    pub fn clamp_to_window(&self, ts: i64) -> i64 {
        ts.clamp(self.start_epoch, self.start_epoch + YEAR_SECONDS - 1)
    }

    /// The full 365-day calendar starting at the window epoch.
    pub fn calendar(&self) -> Vec<DayBucket> {
        (0..365)
            .map(|day_offset| {
                let date = date_for(self.start_epoch + day_offset * 86_400);
                DayBucket {
                    day_key: format!(
                        "{}_{:02}_{:02}",
                        date.year(),
                        date.month(),
                        date.day()
                    ),
                    month_key: format!("{}_{:02}", date.year(), date.month()),
                    year: date.year(),
                    month: date.month(),
                    day: date.day(),
                }
            })
            .collect()
    }

    async fn create_bucket_hierarchy(&self, store: &dyn GraphStore) -> Result<(), StoreError> {
        tracing::info!("Creating temporal bucket hierarchy...");
        let calendar = self.calendar();

        let mut months: Vec<&DayBucket> = Vec::new();
        for bucket in &calendar {
            if months.last().map(|m| m.month_key.as_str()) != Some(bucket.month_key.as_str()) {
                months.push(bucket);
            }
        }

        let month_rows: Vec<String> = months
            .iter()
            .map(|b| {
                map_literal(&[
                    format!("key: {}", escape_str(&b.month_key)),
                    format!("year: {}", b.year),
                    format!("month: {}", b.month),
                ])
            })
            .collect();
        let months_query = format!(
            "UNWIND {} AS m\n\
             MERGE (mo:Month {{key: m.key}})\n\
             SET mo.year = m.year, mo.month = m.month",
            list_literal(&month_rows)
        );

        let day_rows: Vec<String> = calendar
            .iter()
            .map(|b| {
                map_literal(&[
                    format!("key: {}", escape_str(&b.day_key)),
                    format!("month_key: {}", escape_str(&b.month_key)),
                    format!("year: {}", b.year),
                    format!("month: {}", b.month),
                    format!("day: {}", b.day),
                ])
            })
            .collect();
        let days_query = format!(
            "UNWIND {} AS d\n\
             MATCH (m:Month {{key: d.month_key}})\n\
             MERGE (day:Day {{key: d.key}})\n\
             SET day.year = d.year, day.month = d.month, day.day = d.day\n\
             MERGE (m)-[:CONTAINS]->(day)",
            list_literal(&day_rows)
        );

        let mut session = store.session().await?;
        session.run(&StoreQuery::new(months_query)).await?;
        session.run(&StoreQuery::new(days_query)).await?;
        tracing::info!("Created {} month and {} day buckets", months.len(), calendar.len());
        Ok(())
    }

    /// One-round-trip account batch import.
    pub fn account_import_query(&self, batch: &[Account]) -> StoreQuery {
        let rows: Vec<String> = batch
            .iter()
            .map(|a| {
                map_literal(&[
                    format!("id: {}", a.id),
                    format!("name: {}", escape_str(&a.name)),
                    format!("type: {}", escape_str(a.account_type.as_str())),
                    format!("created_at: {}", a.created_at),
                ])
            })
            .collect();
        StoreQuery::new(format!(
            "UNWIND {} AS row\n\
             CREATE (a:Account {{id: row.id, name: row.name, type: row.type, \
             created_at: row.created_at}})",
            list_literal(&rows)
        ))
    }

    /// One-round-trip transaction batch import, linking each transaction to
    /// its accounts and, under the temporal variant, to its Day bucket.
    pub fn transaction_import_query(&self, batch: &[Transaction]) -> StoreQuery {
        let rows: Vec<String> = batch
            .iter()
            .map(|t| self.transaction_row(t, true))
            .collect();
        StoreQuery::new(format!(
            "UNWIND {} AS row\n{}",
            list_literal(&rows),
            self.transaction_create_clause(
                "CREATE (t:Transaction {id: row.id, amount: row.amount, ts: row.ts, \
                 currency: row.currency, status: row.status})"
            )
        ))
    }

    /// Reduced-property batch used by the write-throughput benchmark.
    pub fn write_test_query(&self, batch: &[Transaction]) -> StoreQuery {
        let rows: Vec<String> = batch
            .iter()
            .map(|t| self.transaction_row(t, false))
            .collect();
        StoreQuery::new(format!(
            "UNWIND {} AS row\n{}",
            list_literal(&rows),
            self.transaction_create_clause("CREATE (t:Transaction {id: row.id, ts: row.ts})")
        ))
    }

    fn transaction_row(&self, t: &Transaction, full: bool) -> String {
        let mut entries = vec![format!("id: {}", t.id), format!("ts: {}", t.ts)];
        if full {
            entries.push(format!("amount: {:.2}", t.amount));
            entries.push(format!("currency: {}", escape_str(t.currency)));
            entries.push(format!("status: {}", escape_str(t.status)));
        }
        entries.push(format!("from_acc: {}", t.from_account));
        entries.push(format!("to_acc: {}", t.to_account));
        if let Some(keys) = self.annotate(self.clamp_to_window(t.ts)) {
            entries.push(format!("day_key: {}", escape_str(&keys.day_key)));
        }
        map_literal(&entries)
    }

    fn transaction_create_clause(&self, create_transaction: &str) -> String {
        match self.variant {
            SchemaVariant::Flat => format!(
                "MATCH (from:Account {{id: row.from_acc}})\n\
                 MATCH (to:Account {{id: row.to_acc}})\n\
                 {create_transaction}\n\
                 CREATE (t)-[:FROM]->(from)\n\
                 CREATE (t)-[:TO]->(to)"
            ),
            SchemaVariant::Temporal => format!(
                "MATCH (from:Account {{id: row.from_acc}})\n\
                 MATCH (to:Account {{id: row.to_acc}})\n\
                 MATCH (d:Day {{key: row.day_key}})\n\
                 {create_transaction}\n\
                 CREATE (t)-[:FROM]->(from)\n\
                 CREATE (t)-[:TO]->(to)\n\
                 CREATE (d)-[:CONTAINS]->(t)"
            ),
        }
    }

    /// Count transactions newer than `since`, using the shape this variant
    /// is designed for.
    pub fn timerange_count_query(&self, since: i64) -> StoreQuery {
        let text = match self.variant {
            SchemaVariant::Flat => {
                "MATCH (t:Transaction)\n\
                 WHERE t.ts > $since\n\
                 RETURN count(t) AS count"
            }
            SchemaVariant::Temporal => {
                "MATCH (d:Day)-[:CONTAINS]->(t:Transaction)\n\
                 WHERE t.ts > $since\n\
                 RETURN count(t) AS count"
            }
        };
        StoreQuery::new(text).param("since", since)
    }
}

/// Bucket keys for a unix timestamp's calendar date.
fn bucket_keys(ts: i64) -> BucketKeys {
    let date = date_for(ts);
    BucketKeys {
        month_key: format!("{}_{:02}", date.year(), date.month()),
        day_key: format!("{}_{:02}_{:02}", date.year(), date.month(), date.day()),
    }
}

fn date_for(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
