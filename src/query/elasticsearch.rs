//! Elasticsearch HTTP client
//!
//! Minimal client that turns a configured request into one HTTP call and classifies the answer.

use super::{QueryError, QueryExecutor};
use crate::config::QueryDefinition;
use core::time::Duration;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

/// Longest slice of a non-JSON error body quoted in a rejection reason
const MAX_REASON_LEN: usize = 200;

/// Query executor talking to Elasticsearch (or an API-compatible backend) over HTTP.
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    client: reqwest::Client,
}

impl ElasticsearchClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("es-query-exporter/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

impl QueryExecutor for ElasticsearchClient {
    /// Try each configured server in order.
    ///
    /// Only failures to get any answer at all move on to the next server; an HTTP error response
    /// from a server is final.
    async fn execute(&self, query: &QueryDefinition, index: Option<&str>) -> Result<Value, QueryError> {
        let mut last_error = QueryError::InvalidArguments(format!("request '{}' has no server", query.name));

        for server in &query.servers {
            let plan = query.action.plan(server, index, &query.args)?;
            let shown = redacted(&plan.url);
            log::debug!("request '{}': {} {shown}", query.name, plan.method);

            let mut request = self.client.request(plan.method, plan.url);
            if plan.sends_body
                && let Some(body) = &query.body
            {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => return classify_response(response, index).await,
                Err(e) => {
                    let server = redacted(server);
                    let e = e.without_url();
                    log::warn!("request '{}' could not reach {server}: {e}", query.name);
                    last_error = QueryError::Transport(format!("{server}: {e}"));
                }
            }
        }

        Err(last_error)
    }
}

/// `url` with any embedded password masked, for logs and error messages.
fn redacted(url: &Url) -> Url {
    let mut shown = url.clone();
    if shown.password().is_some() {
        let _ = shown.set_password(Some("***"));
    }
    shown
}

async fn classify_response(response: reqwest::Response, index: Option<&str>) -> Result<Value, QueryError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| QueryError::Transport(format!("reading response body: {e}")))?;

    if status.is_success() {
        return serde_json::from_str(&text).map_err(|e| QueryError::InvalidResponse(e.to_string()));
    }

    let body: Option<Value> = serde_json::from_str(&text).ok();
    let error = body.as_ref().and_then(|b| b.get("error"));

    if status == StatusCode::NOT_FOUND
        && error.and_then(|e| e.get("type")).and_then(Value::as_str) == Some("index_not_found_exception")
    {
        let index = error
            .and_then(|e| e.get("index"))
            .and_then(Value::as_str)
            .or(index)
            .unwrap_or_default()
            .to_string();
        return Err(QueryError::IndexNotFound { index });
    }

    let reason = match error {
        Some(Value::String(reason)) => reason.clone(),
        Some(e) => e
            .get("reason")
            .and_then(Value::as_str)
            .map_or_else(|| e.to_string(), ToString::to_string),
        None => text.chars().take(MAX_REASON_LEN).collect(),
    };

    Err(QueryError::Rejected {
        status: status.as_u16(),
        reason,
    })
}
