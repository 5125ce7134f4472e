//! Store collaborator capability.
//!
//! The benchmark core talks to the backing graph store through two small
//! traits: [`GraphStore`] opens sessions and manages indexes, and
//! [`StoreSession`] executes parametrized queries. Errors carry the
//! transient-vs-fatal distinction the importer's retry policy dispatches on.

pub mod cypher;
pub mod neo4j;

pub use neo4j::Neo4jStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by the store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A retry-recoverable condition such as temporary unavailability.
    #[error("transient store error: {0}")]
    Transient(String),

    /// A query was rejected or returned an unusable result.
    #[error("query error: {0}")]
    Query(String),

    /// Driver or server failure that retrying will not fix.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the importer's bounded retry applies to this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Scalar query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

/// A parametrized query ready for submission to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub text: String,
    pub params: Vec<(String, ParamValue)>,
}

impl StoreQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }
}

/// A scoped unit of store work. Sessions are single-owner; the concurrency
/// runner gives each worker its own. Dropping a session releases it.
#[async_trait]
pub trait StoreSession: Send {
    /// Execute a query and drain the result without materializing rows.
    async fn run(&mut self, query: &StoreQuery) -> Result<(), StoreError>;

    /// Execute a query and return the `count` column of its single row.
    async fn count(&mut self, query: &StoreQuery) -> Result<i64, StoreError>;
}

/// Connection-level store capability.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Open a session for a sequence of queries.
    async fn session(&self) -> Result<Box<dyn StoreSession>, StoreError>;

    /// Idempotently create an index over `label.property`.
    async fn create_index(
        &self,
        name: &str,
        label: &str,
        property: &str,
    ) -> Result<(), StoreError>;
}
