//! Exporter configuration.
//!
//! The configuration is a YAML document with three sections: `exporter` (process settings),
//! `requests` (named queries against the search backend), and `metrics` (named gauges, each fed by
//! one or more sources that point into query results).

#[expect(clippy::module_inception, reason = "Mirrors the config module layout")]
mod config;

pub use config::{
    Config, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_YAML, ExporterSettings, Extraction, Labels, MetricDefinition, QueryDefinition,
    SourceSpec,
};
