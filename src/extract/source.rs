//! Turns a metric source plus the current query results into a single gauge value.

use super::{ExtractionError, navigate, resolve_path, search_key};
use crate::config::{Extraction, Labels, SourceSpec};
use crate::query::QueryResults;
use serde_json::Value;

/// Value recorded when a source cannot be resolved.
///
/// Distinguishes "the exporter tried and failed" from a series that was never written at all.
pub const SENTINEL_VALUE: f64 = -1.0;

/// A successfully extracted value along with the labels of the source it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedValue<'a> {
    pub value: f64,
    pub labels: Option<&'a Labels>,
}

/// Resolve one source against this cycle's query results.
///
/// Search-mode sources use only the first match; later matches are ignored.
pub fn resolve<'a>(source: &'a SourceSpec, results: &QueryResults) -> Result<ResolvedValue<'a>, ExtractionError> {
    let tree = results.tree(&source.query).ok_or_else(|| ExtractionError::QueryUnavailable {
        query: source.query.clone(),
    })?;

    let node = match &source.extraction {
        Extraction::Search(key) => *search_key(tree, key)
            .first()
            .ok_or_else(|| ExtractionError::NoMatch { key: key.clone() })?,
        Extraction::Path(path) => navigate(tree, &resolve_path(path))?,
    };

    Ok(ResolvedValue {
        value: as_scalar(node)?,
        labels: source.labels.as_ref(),
    })
}

/// Interpret a result node as a gauge value.
///
/// Numbers are used as-is, booleans become 1 or 0, and strings are accepted when they parse as a finite number.
pub fn as_scalar(node: &Value) -> Result<f64, ExtractionError> {
    match node {
        Value::Number(n) => n.as_f64().ok_or(ExtractionError::NotScalar { found: "number" }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ExtractionError::NotNumeric { text: s.clone() }),
        Value::Null => Err(ExtractionError::NotScalar { found: "null" }),
        Value::Array(_) => Err(ExtractionError::NotScalar { found: "sequence" }),
        Value::Object(_) => Err(ExtractionError::NotScalar { found: "mapping" }),
    }
}
