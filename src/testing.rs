//! In-process store doubles for exercising the harness without a live
//! database.
//!
//! [`MockStore`] implements the store capability with a scripted outcome
//! queue: each executed query consumes the next outcome (defaulting to
//! success once the script is exhausted) and is recorded for later
//! inspection. Cloning a `MockStore` shares its state, so a test can keep a
//! handle while the harness owns the store as `Arc<dyn GraphStore>`.

use crate::store::{GraphStore, StoreError, StoreQuery, StoreSession};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted outcome for one store call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockOutcome {
    /// The call succeeds; `count()` reads 0.
    Ok,
    /// The call succeeds; `count()` reads this value.
    Count(i64),
    /// The call fails with a retryable error.
    Transient,
    /// The call fails with a non-retryable error.
    Fatal,
}

#[derive(Default)]
struct MockState {
    script: Mutex<VecDeque<MockOutcome>>,
    queries: Mutex<Vec<StoreQuery>>,
    indexes: Mutex<Vec<String>>,
    op_delay: Option<Duration>,
}

/// Scripted in-memory store double.
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<MockState>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose first calls consume `outcomes` in order.
    pub fn with_script(outcomes: impl IntoIterator<Item = MockOutcome>) -> Self {
        let store = Self::new();
        for outcome in outcomes {
            store.push_outcome(outcome);
        }
        store
    }

    /// A store that sleeps `delay` on every call, simulating round-trip
    /// latency.
    pub fn with_op_delay(delay: Duration) -> Self {
        Self {
            state: Arc::new(MockState {
                op_delay: Some(delay),
                ..Default::default()
            }),
        }
    }

    pub fn push_outcome(&self, outcome: MockOutcome) {
        self.state.script.lock().unwrap().push_back(outcome);
    }

    /// Every query executed so far, in order.
    pub fn queries(&self) -> Vec<StoreQuery> {
        self.state.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.state.queries.lock().unwrap().len()
    }

    /// Index names created so far.
    pub fn created_indexes(&self) -> Vec<String> {
        self.state.indexes.lock().unwrap().clone()
    }

    fn next_outcome(&self, query: &StoreQuery) -> MockOutcome {
        self.state.queries.lock().unwrap().push(query.clone());
        self.state
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockOutcome::Ok)
    }

    async fn simulate_round_trip(&self) {
        match self.state.op_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            // A store call is a suspension point even when it is instant.
            None => tokio::task::yield_now().await,
        }
    }
}

#[async_trait]
impl GraphStore for MockStore {
    async fn session(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        Ok(Box::new(MockSession {
            store: self.clone(),
        }))
    }

    async fn create_index(
        &self,
        name: &str,
        _label: &str,
        _property: &str,
    ) -> Result<(), StoreError> {
        self.state.indexes.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

struct MockSession {
    store: MockStore,
}

#[async_trait]
impl StoreSession for MockSession {
    async fn run(&mut self, query: &StoreQuery) -> Result<(), StoreError> {
        self.store.simulate_round_trip().await;
        match self.store.next_outcome(query) {
            MockOutcome::Ok | MockOutcome::Count(_) => Ok(()),
            MockOutcome::Transient => {
                Err(StoreError::Transient("injected transient failure".into()))
            }
            MockOutcome::Fatal => Err(StoreError::Backend("injected fatal failure".into())),
        }
    }

    async fn count(&mut self, query: &StoreQuery) -> Result<i64, StoreError> {
        self.store.simulate_round_trip().await;
        match self.store.next_outcome(query) {
            MockOutcome::Count(value) => Ok(value),
            MockOutcome::Ok => Ok(0),
            MockOutcome::Transient => {
                Err(StoreError::Transient("injected transient failure".into()))
            }
            MockOutcome::Fatal => Err(StoreError::Backend("injected fatal failure".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_is_consumed_in_order_then_defaults_to_ok() {
        let store = MockStore::with_script([MockOutcome::Transient, MockOutcome::Count(7)]);
        let mut session = store.session().await.unwrap();

        let query = StoreQuery::new("RETURN 1 AS count");
        assert!(session.run(&query).await.unwrap_err().is_transient());
        assert_eq!(session.count(&query).await.unwrap(), 7);
        // Script exhausted: further calls succeed.
        assert!(session.run(&query).await.is_ok());
        assert_eq!(store.query_count(), 3);
    }

    #[tokio::test]
    async fn test_queries_are_recorded() {
        let store = MockStore::new();
        let mut session = store.session().await.unwrap();
        session
            .run(&StoreQuery::new("CREATE (n:Account)"))
            .await
            .unwrap();
        let queries = store.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].text, "CREATE (n:Account)");
    }
}
