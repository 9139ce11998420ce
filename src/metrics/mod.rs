//! Gauges and their exposition.
//!
//! Every configured metric becomes one Prometheus gauge, created the first time the metric is
//! exported and never removed. Metrics fed by several sources become labelled gauges whose label
//! names come from the first source declaring labels; each source then writes its own series.

mod exposition;
mod gauge_registry;

pub use exposition::{router, serve};
pub use gauge_registry::{GaugeHandle, GaugeRegistry, LabelSchemaError, label_schema, render};
