//! es-query-exporter crate
//!
//! Periodically runs a configured set of Elasticsearch queries and republishes selected fields
//! of their results as Prometheus gauges.
//!
//! # Module Organization
//!
//! - [`config`]: YAML configuration model and loading
//! - [`query`]: Query execution against the search backend, including the date-template retry
//! - [`extract`]: Value extraction from result trees (dotted paths and recursive key search)
//! - [`metrics`]: Gauge registry and the HTTP exposition endpoint
//! - [`refresh`]: The query/export/sleep loop tying everything together
//! - [`commands`]: Command-line entry points
//!
//! This crate's API is fluid and may change without warning and in a semver-incompatible way.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod commands;

#[doc(hidden)]
pub mod config;

#[doc(hidden)]
pub mod extract;

#[doc(hidden)]
pub mod logging;

#[doc(hidden)]
pub mod metrics;

#[doc(hidden)]
pub mod query;

#[doc(hidden)]
pub mod refresh;

pub use crate::commands::{Host, run};
