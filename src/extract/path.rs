//! Dotted-path parsing and navigation.

use super::ExtractionError;
use core::fmt;
use serde_json::Value;

/// One step of a dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A mapping key.
    Key(String),

    /// A sequence index.
    Index(usize),

    /// A segment that starts with a digit but is not a valid index (e.g. `3abc`).
    ///
    /// Such segments are classified as indices from their first character alone, so they can
    /// never match a mapping key and always fail during navigation.
    InvalidIndex(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "{index}"),
            Self::InvalidIndex(raw) => write!(f, "{raw}"),
        }
    }
}

/// Split a dotted path into segments.
///
/// The input is split on every `.`. A segment whose first character is an ASCII digit is treated
/// as a sequence index; everything else is a mapping key. No validation against any tree happens here.
#[must_use]
pub fn resolve(path: &str) -> Vec<PathSegment> {
    path.split('.')
        .map(|segment| {
            if segment.starts_with(|c: char| c.is_ascii_digit()) {
                segment
                    .parse::<usize>()
                    .map_or_else(|_| PathSegment::InvalidIndex(segment.to_string()), PathSegment::Index)
            } else {
                PathSegment::Key(segment.to_string())
            }
        })
        .collect()
}

/// Walk `tree` along `segments`, returning the node at the end of the path.
pub fn navigate<'a>(tree: &'a Value, segments: &[PathSegment]) -> Result<&'a Value, ExtractionError> {
    let mut node = tree;

    for (depth, segment) in segments.iter().enumerate() {
        node = match (segment, node) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key).ok_or_else(|| ExtractionError::MissingKey {
                key: key.clone(),
                depth,
            })?,

            (PathSegment::Index(index), Value::Array(items)) => items.get(*index).ok_or(ExtractionError::IndexOutOfRange {
                index: *index,
                len: items.len(),
                depth,
            })?,

            (PathSegment::InvalidIndex(raw), _) => {
                return Err(ExtractionError::InvalidIndex {
                    segment: raw.clone(),
                    depth,
                });
            }

            (segment, node) => {
                return Err(ExtractionError::TypeMismatch {
                    segment: segment.to_string(),
                    found: node_kind(node),
                    depth,
                });
            }
        };
    }

    Ok(node)
}

/// Short name of a node's kind, for diagnostics.
pub(crate) const fn node_kind(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
