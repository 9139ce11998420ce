//! Export Elasticsearch query results as Prometheus gauges.
//!
//! # Quick Start
//!
//! Write a starter configuration, check it, then serve metrics:
//!
//! ```bash
//! es-query-exporter init config.yaml
//! es-query-exporter validate --config config.yaml
//! es-query-exporter run --config config.yaml
//! ```
//!
//! Metrics are then available at `http://<host>:<exporter.port>/metrics`.
//!
//! Use `es-query-exporter once` to run a single refresh cycle and print the resulting metrics,
//! which is the quickest way to check that paths and search keys pick the values you expect.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use es_query_exporter::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that writes to the real standard streams.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
