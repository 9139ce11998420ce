use super::QueryError;
use serde_json::Value;
use std::collections::HashMap;

/// What became of one query during a refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The query ran and returned this result tree.
    Success(Value),

    /// The query failed; no result is available this cycle.
    Failed(QueryError),
}

/// The outcome of every query run in one cycle, keyed by query name.
///
/// A fresh set is built for every cycle, so nothing from an earlier cycle can leak into a later export.
#[derive(Debug, Clone, Default)]
pub struct QueryResults {
    outcomes: HashMap<String, QueryOutcome>,
}

impl QueryResults {
    pub fn insert(&mut self, name: impl Into<String>, outcome: QueryOutcome) {
        let _ = self.outcomes.insert(name.into(), outcome);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&QueryOutcome> {
        self.outcomes.get(name)
    }

    /// The result tree of a successful query, or `None` if it failed or never ran.
    #[must_use]
    pub fn tree(&self, name: &str) -> Option<&Value> {
        match self.outcomes.get(name)? {
            QueryOutcome::Success(tree) => Some(tree),
            QueryOutcome::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of queries that failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes.values().filter(|o| matches!(o, QueryOutcome::Failed(_))).count()
    }
}
