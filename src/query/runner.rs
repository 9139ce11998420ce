use super::{QueryError, QueryExecutor, QueryOutcome, QueryResults, resolve_date_template};
use crate::config::QueryDefinition;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Runs every configured query once per cycle and collects the outcomes.
#[derive(Debug)]
pub struct QueryRunner<E> {
    executor: E,
}

impl<E: QueryExecutor> QueryRunner<E> {
    pub const fn new(executor: E) -> Self {
        Self { executor }
    }

    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Run all queries in declaration order.
    ///
    /// A failing query is logged and recorded; it never stops the remaining queries.
    pub async fn run_all(&self, queries: &[QueryDefinition], now: DateTime<Utc>) -> QueryResults {
        let mut results = QueryResults::default();

        for query in queries {
            let outcome = match self.run_one(query, now).await {
                Ok(tree) => {
                    log::debug!("request '{}' succeeded", query.name);
                    QueryOutcome::Success(tree)
                }
                Err(e) => {
                    log::error!("request '{}' failed: {e}", query.name);
                    QueryOutcome::Failed(e)
                }
            };

            results.insert(query.name.as_str(), outcome);
        }

        results
    }

    /// Run a single query, retrying once against today's concrete index when the configured
    /// index is a daily date template the backend could not resolve.
    pub async fn run_one(&self, query: &QueryDefinition, now: DateTime<Utc>) -> Result<Value, QueryError> {
        let index = query.index.as_deref();

        match self.executor.execute(query, index).await {
            Err(QueryError::IndexNotFound { index: missing }) => {
                let Some(resolved) = index.and_then(|i| resolve_date_template(i, now)) else {
                    return Err(QueryError::IndexNotFound { index: missing });
                };

                log::warn!(
                    "request '{}': index '{}' not found, retrying with '{resolved}'",
                    query.name,
                    index.unwrap_or_default()
                );
                self.executor.execute(query, Some(&resolved)).await
            }
            other => other,
        }
    }
}
