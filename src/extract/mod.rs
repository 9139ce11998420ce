//! Value extraction from query result trees.
//!
//! A metric source points at one query result and describes how to find a single number inside it,
//! either by following a dotted path ([`path`]) or by searching the whole tree for a key ([`search`]).
//! [`source::resolve`] combines the two with the scalar coercion rules and reports every way the
//! lookup can go wrong as an [`ExtractionError`].

mod path;
mod search;
mod source;

pub use path::{PathSegment, navigate, resolve as resolve_path};
pub use search::extract as search_key;
pub use source::{ResolvedValue, SENTINEL_VALUE, as_scalar, resolve};

use core::fmt;

/// Why a source could not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The referenced query has no result this cycle, either because it failed or because no such query was run.
    QueryUnavailable { query: String },

    /// A search found no value under the requested key.
    NoMatch { key: String },

    /// The selected node is null, a mapping, or a sequence.
    NotScalar { found: &'static str },

    /// The selected node is a string that does not parse as a number.
    NotNumeric { text: String },

    /// A path step named a key that the mapping does not contain.
    MissingKey { key: String, depth: usize },

    /// A path step indexed past the end of a sequence.
    IndexOutOfRange { index: usize, len: usize, depth: usize },

    /// A path step did not fit the node kind (key into a sequence, index into a mapping, anything into a scalar).
    TypeMismatch { segment: String, found: &'static str, depth: usize },

    /// A path step looked like an index but was not one.
    InvalidIndex { segment: String, depth: usize },
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryUnavailable { query } => write!(f, "no result available for query '{query}'"),
            Self::NoMatch { key } => write!(f, "no value found for key '{key}'"),
            Self::NotScalar { found } => write!(f, "expected a scalar value, found {found}"),
            Self::NotNumeric { text } => write!(f, "value '{text}' is not numeric"),
            Self::MissingKey { key, depth } => write!(f, "key '{key}' not found at path segment {depth}"),
            Self::IndexOutOfRange { index, len, depth } => {
                write!(f, "index {index} out of range for sequence of length {len} at path segment {depth}")
            }
            Self::TypeMismatch { segment, found, depth } => {
                write!(f, "cannot apply '{segment}' to a {found} at path segment {depth}")
            }
            Self::InvalidIndex { segment, depth } => write!(f, "'{segment}' is not a valid index at path segment {depth}"),
        }
    }
}

impl core::error::Error for ExtractionError {}
