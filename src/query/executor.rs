use crate::config::QueryDefinition;
use core::fmt;
use serde_json::Value;

/// Why a query produced no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The backend reported that the targeted index does not exist.
    IndexNotFound { index: String },

    /// The backend answered with a non-success status.
    Rejected { status: u16, reason: String },

    /// No server could be reached.
    Transport(String),

    /// The request could not be built from its configuration.
    InvalidArguments(String),

    /// The backend answered successfully but the body was not JSON.
    InvalidResponse(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexNotFound { index } => write!(f, "index '{index}' not found"),
            Self::Rejected { status, reason } => write!(f, "backend rejected the request with HTTP {status}: {reason}"),
            Self::Transport(detail) => write!(f, "unable to reach the backend: {detail}"),
            Self::InvalidArguments(detail) => write!(f, "invalid request: {detail}"),
            Self::InvalidResponse(detail) => write!(f, "invalid response from the backend: {detail}"),
        }
    }
}

impl core::error::Error for QueryError {}

/// Runs one query against the backend.
pub trait QueryExecutor {
    /// Execute `query`, targeting `index` instead of the configured index.
    ///
    /// The runner passes the configured index on the first attempt and a resolved date-template
    /// name on the retry.
    fn execute(&self, query: &QueryDefinition, index: Option<&str>) -> impl Future<Output = Result<Value, QueryError>> + Send;
}
