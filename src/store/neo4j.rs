//! Neo4j-backed implementation of the store capability.

use super::{GraphStore, ParamValue, StoreError, StoreQuery, StoreSession};
use crate::Neo4jOpts;
use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph};

/// Store backed by a `neo4rs` connection pool.
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Build the driver configuration and connect. Connections are
    /// established lazily by the pool, so this succeeds without a live
    /// server (a dry run never opens one).
    pub fn connect(opts: &Neo4jOpts) -> Result<Self, StoreError> {
        let config = ConfigBuilder::default()
            .uri(&opts.neo4j_uri)
            .user(opts.neo4j_username.clone())
            .password(opts.neo4j_password.clone())
            .db(opts.neo4j_database.clone())
            .build()
            .map_err(classify)?;
        let graph = Graph::connect(config).map_err(classify)?;
        tracing::debug!("Neo4j driver configured for {}", opts.neo4j_uri);
        Ok(Self { graph })
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn session(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        // The pool hands out connections per query; a session is a handle
        // that keeps query submission scoped to one owner.
        Ok(Box::new(Neo4jSession {
            graph: self.graph.clone(),
        }))
    }

    async fn create_index(
        &self,
        name: &str,
        label: &str,
        property: &str,
    ) -> Result<(), StoreError> {
        let cypher =
            format!("CREATE INDEX {name} IF NOT EXISTS FOR (n:{label}) ON (n.{property})");
        tracing::debug!("Creating index: {cypher}");
        self.graph
            .run(neo4rs::query(&cypher))
            .await
            .map_err(classify)
    }
}

struct Neo4jSession {
    graph: Graph,
}

#[async_trait]
impl StoreSession for Neo4jSession {
    async fn run(&mut self, query: &StoreQuery) -> Result<(), StoreError> {
        let mut result = self
            .graph
            .execute(to_neo4rs_query(query))
            .await
            .map_err(classify)?;
        // Drain without materializing; latency tests time full consumption.
        while result.next().await.map_err(classify)?.is_some() {}
        Ok(())
    }

    async fn count(&mut self, query: &StoreQuery) -> Result<i64, StoreError> {
        let mut result = self
            .graph
            .execute(to_neo4rs_query(query))
            .await
            .map_err(classify)?;
        match result.next().await.map_err(classify)? {
            Some(row) => row
                .get::<i64>("count")
                .map_err(|e| StoreError::Query(format!("Failed to read count column: {e}"))),
            None => Err(StoreError::Query("Count query returned no rows".into())),
        }
    }
}

fn to_neo4rs_query(query: &StoreQuery) -> neo4rs::Query {
    let mut q = neo4rs::query(&query.text);
    for (key, value) in &query.params {
        q = match value {
            ParamValue::Int(v) => q.param(key, *v),
            ParamValue::Float(v) => q.param(key, *v),
            ParamValue::Str(v) => q.param(key, v.clone()),
        };
    }
    q
}

/// Map driver errors onto the retry taxonomy. Connection-level failures and
/// server codes in the `Neo.TransientError` family are retryable; everything
/// else is fatal.
fn classify(e: neo4rs::Error) -> StoreError {
    let message = e.to_string();
    if is_transient_message(&message) {
        StoreError::Transient(message)
    } else {
        StoreError::Backend(message)
    }
}

fn is_transient_message(message: &str) -> bool {
    message.contains("Neo.TransientError")
        || message.contains("ServiceUnavailable")
        || message.contains("SessionExpired")
        || message.to_ascii_lowercase().contains("connection")
}
