//! The exporter's main loop: run every query, publish every metric, sleep, repeat.

use crate::config::{Config, MetricDefinition, QueryDefinition};
use crate::extract::{self, SENTINEL_VALUE};
use crate::metrics::{GaugeRegistry, render};
use crate::query::{QueryExecutor, QueryResults, QueryRunner};
use chrono::{DateTime, Utc};
use core::time::Duration;

/// Tally of one export phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Series set from a successfully extracted value
    pub exported: usize,

    /// Series set to the sentinel because extraction failed
    pub extraction_failures: usize,

    /// Updates that could not be applied because their labels do not fit the gauge
    pub config_errors: usize,
}

/// Tally of one full refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub queries: usize,
    pub query_failures: usize,
    pub export: ExportReport,
}

/// Owns all state that lives across refresh cycles.
#[derive(Debug)]
pub struct RefreshCycle<E> {
    runner: QueryRunner<E>,
    gauges: GaugeRegistry,
    queries: Vec<QueryDefinition>,
    metrics: Vec<MetricDefinition>,
    interval: Duration,
}

impl<E: QueryExecutor> RefreshCycle<E> {
    pub fn new(executor: E, config: &Config) -> Self {
        Self {
            runner: QueryRunner::new(executor),
            gauges: GaugeRegistry::new(),
            queries: config.requests.clone(),
            metrics: config.metrics.clone(),
            interval: Duration::from_secs(config.exporter.refresh),
        }
    }

    pub const fn gauges(&self) -> &GaugeRegistry {
        &self.gauges
    }

    /// Current metrics in the Prometheus text format.
    pub fn render(&self) -> crate::Result<String> {
        render(&self.gauges.registry())
    }

    /// Run the query phase and then the export phase once.
    pub async fn run_once(&mut self, now: DateTime<Utc>) -> CycleReport {
        let results = self.runner.run_all(&self.queries, now).await;
        let export = self.export(&results);

        let report = CycleReport {
            queries: results.len(),
            query_failures: results.failure_count(),
            export,
        };

        log::info!(
            "refresh done: {}/{} queries ok, {} series exported, {} extraction failures, {} label errors",
            report.queries - report.query_failures,
            report.queries,
            export.exported,
            export.extraction_failures,
            export.config_errors
        );

        report
    }

    /// Publish every metric from `results`.
    ///
    /// A source whose value cannot be extracted sets its series to the sentinel. Gauges are created
    /// on first use; a gauge that cannot be created is skipped for this cycle.
    pub fn export(&mut self, results: &QueryResults) -> ExportReport {
        let mut report = ExportReport::default();

        for metric in &self.metrics {
            if metric.sources.is_empty() {
                continue;
            }

            let handle = match self.gauges.ensure_gauge(&metric.name, &metric.description, &metric.sources) {
                Ok(handle) => handle,
                Err(e) => {
                    log::error!("metric '{}' skipped: {e:#}", metric.name);
                    continue;
                }
            };

            for source in &metric.sources {
                let labels = if metric.is_labelled() { source.labels.as_ref() } else { None };

                let (value, extracted) = match extract::resolve(source, results) {
                    Ok(resolved) => (resolved.value, true),
                    Err(e) => {
                        log::warn!("metric '{}', source '{}': {e}", metric.name, source.query);
                        (SENTINEL_VALUE, false)
                    }
                };

                match self.gauges.set_value(&handle, labels, value) {
                    Ok(()) if extracted => report.exported += 1,
                    Ok(()) => report.extraction_failures += 1,
                    Err(e) => {
                        log::error!("metric '{}', source '{}': {e}", metric.name, source.query);
                        report.config_errors += 1;
                    }
                }
            }
        }

        report
    }

    /// Refresh forever, sleeping the configured interval between cycles.
    #[expect(clippy::infinite_loop, reason = "The exporter refreshes until the process is stopped")]
    pub async fn run_forever(&mut self) {
        loop {
            let _ = self.run_once(Utc::now()).await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
