use crate::Result;
use crate::config::{Labels, SourceSpec};
use core::fmt;
use ohno::IntoAppError;
use prometheus::{Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;

/// Label names a metric's gauge is partitioned by.
///
/// Only metrics fed by more than one source are labelled. The schema is the label names of the first
/// source that declares any; `None` when no source does, in which case the gauge stays unlabelled.
#[must_use]
pub fn label_schema(sources: &[SourceSpec]) -> Option<Vec<String>> {
    if sources.len() < 2 {
        return None;
    }

    sources
        .iter()
        .filter_map(|s| s.labels.as_ref())
        .find(|labels| !labels.is_empty())
        .map(|labels| labels.keys().cloned().collect())
}

/// A value update whose labels do not fit the gauge it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSchemaError {
    pub metric: String,
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

impl fmt::Display for LabelSchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "metric '{}' expects labels [{}] but was given [{}]",
            self.metric,
            self.expected.join(", "),
            self.found.join(", ")
        )
    }
}

impl core::error::Error for LabelSchemaError {}

/// A gauge created by the registry.
#[derive(Debug, Clone)]
pub enum GaugeHandle {
    Unlabelled {
        metric: String,
        gauge: Gauge,
    },
    Labelled {
        metric: String,
        vec: GaugeVec,
        label_names: Vec<String>,
    },
}

impl GaugeHandle {
    /// Label names of the gauge; empty when unlabelled.
    #[must_use]
    pub fn label_names(&self) -> &[String] {
        match self {
            Self::Unlabelled { .. } => &[],
            Self::Labelled { label_names, .. } => label_names,
        }
    }

    fn metric(&self) -> &str {
        match self {
            Self::Unlabelled { metric, .. } | Self::Labelled { metric, .. } => metric,
        }
    }
}

/// Owns every gauge the exporter publishes, keyed by metric name.
#[derive(Debug, Default)]
pub struct GaugeRegistry {
    registry: Registry,
    gauges: HashMap<String, GaugeHandle>,
}

impl GaugeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the gauge for `name`, creating and registering it on first use.
    ///
    /// Later calls with the same name return the existing gauge untouched, whatever sources they pass.
    pub fn ensure_gauge(&mut self, name: &str, description: &str, sources: &[SourceSpec]) -> Result<GaugeHandle> {
        if let Some(handle) = self.gauges.get(name) {
            return Ok(handle.clone());
        }

        let help = if description.trim().is_empty() { name } else { description };
        let opts = Opts::new(name, help);

        let handle = match label_schema(sources) {
            None => {
                let gauge = Gauge::with_opts(opts).into_app_err_with(|| format!("creating gauge '{name}'"))?;
                self.registry
                    .register(Box::new(gauge.clone()))
                    .into_app_err_with(|| format!("registering gauge '{name}'"))?;
                GaugeHandle::Unlabelled {
                    metric: name.to_string(),
                    gauge,
                }
            }
            Some(label_names) => {
                let names: Vec<&str> = label_names.iter().map(String::as_str).collect();
                let vec = GaugeVec::new(opts, &names).into_app_err_with(|| format!("creating gauge '{name}'"))?;
                self.registry
                    .register(Box::new(vec.clone()))
                    .into_app_err_with(|| format!("registering gauge '{name}'"))?;
                GaugeHandle::Labelled {
                    metric: name.to_string(),
                    vec,
                    label_names,
                }
            }
        };

        log::debug!("created gauge '{name}' with labels [{}]", handle.label_names().join(", "));
        let _ = self.gauges.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    /// Set one series of a gauge.
    ///
    /// An unlabelled gauge takes no labels (an empty map counts as none). A labelled gauge needs a
    /// label map whose names are exactly its schema.
    pub fn set_value(&self, handle: &GaugeHandle, labels: Option<&Labels>, value: f64) -> Result<(), LabelSchemaError> {
        let given: Vec<String> = labels.map(|l| l.keys().cloned().collect()).unwrap_or_default();

        let mismatch = || LabelSchemaError {
            metric: handle.metric().to_string(),
            expected: handle.label_names().to_vec(),
            found: given.clone(),
        };

        match handle {
            GaugeHandle::Unlabelled { gauge, .. } => {
                if !given.is_empty() {
                    return Err(mismatch());
                }
                gauge.set(value);
            }
            GaugeHandle::Labelled { vec, label_names, .. } => {
                let Some(labels) = labels.filter(|_| given == *label_names) else {
                    return Err(mismatch());
                };

                // BTreeMap keys come out sorted, the same order the schema was taken in
                let values: Vec<&str> = labels.values().map(String::as_str).collect();
                vec.get_metric_with_label_values(&values).ok().ok_or_else(mismatch)?.set(value);
            }
        }

        Ok(())
    }

    /// The underlying Prometheus registry, shared with the exposition endpoint.
    #[must_use]
    pub fn registry(&self) -> Registry {
        self.registry.clone()
    }

    #[must_use]
    pub fn gauge_count(&self) -> usize {
        self.gauges.len()
    }

    /// Current state of every gauge in the Prometheus text format.
    pub fn render(&self) -> Result<String> {
        render(&self.registry)
    }
}

/// Encode everything in `registry` in the Prometheus text format.
pub fn render(registry: &Registry) -> Result<String> {
    TextEncoder::new()
        .encode_to_string(&registry.gather())
        .into_app_err("encoding metrics")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Extraction;

    fn source(labels: &[(&str, &str)]) -> SourceSpec {
        SourceSpec {
            query: "q".to_string(),
            extraction: Extraction::Path("count".to_string()),
            labels: (!labels.is_empty()).then(|| labels.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()),
        }
    }

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_label_schema_single_source_is_unlabelled() {
        assert_eq!(label_schema(&[source(&[("env", "prod")])]), None);
    }

    #[test]
    fn test_label_schema_first_labelled_source_wins() {
        let sources = [source(&[]), source(&[("zone", "a"), ("env", "prod")]), source(&[("other", "x")])];
        assert_eq!(label_schema(&sources), Some(vec!["env".to_string(), "zone".to_string()]));
    }

    #[test]
    fn test_label_schema_without_any_labels() {
        assert_eq!(label_schema(&[source(&[]), source(&[])]), None);
    }

    #[test]
    fn test_ensure_gauge_is_idempotent() {
        let mut registry = GaugeRegistry::new();
        let sources = [source(&[("env", "prod")]), source(&[("env", "dev")])];

        let first = registry.ensure_gauge("docs", "Documents", &sources).unwrap();
        let second = registry.ensure_gauge("docs", "Documents", &sources[..1]).unwrap();

        assert_eq!(registry.gauge_count(), 1);
        assert_eq!(first.label_names(), ["env".to_string()]);
        assert_eq!(second.label_names(), first.label_names());
    }

    #[test]
    fn test_unlabelled_set_value() {
        let mut registry = GaugeRegistry::new();
        let handle = registry.ensure_gauge("up", "", &[source(&[])]).unwrap();

        registry.set_value(&handle, None, 42.0).unwrap();
        registry.set_value(&handle, Some(&Labels::new()), 43.0).unwrap();

        let text = registry.render().unwrap();
        assert!(text.contains("# HELP up up"), "{text}");
        assert!(text.contains("up 43"), "{text}");
    }

    #[test]
    fn test_unlabelled_rejects_labels() {
        let mut registry = GaugeRegistry::new();
        let handle = registry.ensure_gauge("up", "Up", &[source(&[])]).unwrap();

        let err = registry.set_value(&handle, Some(&labels(&[("env", "prod")])), 1.0).unwrap_err();
        assert_eq!(err.expected, Vec::<String>::new());
        assert_eq!(err.found, ["env".to_string()]);
    }

    #[test]
    fn test_labelled_series() {
        let mut registry = GaugeRegistry::new();
        let sources = [source(&[("env", "prod")]), source(&[("env", "dev")])];
        let handle = registry.ensure_gauge("docs", "Documents", &sources).unwrap();

        registry.set_value(&handle, Some(&labels(&[("env", "prod")])), 10.0).unwrap();
        registry.set_value(&handle, Some(&labels(&[("env", "dev")])), 3.0).unwrap();

        let text = registry.render().unwrap();
        assert!(text.contains(r#"docs{env="prod"} 10"#), "{text}");
        assert!(text.contains(r#"docs{env="dev"} 3"#), "{text}");
    }

    #[test]
    fn test_labelled_rejects_mismatched_names() {
        let mut registry = GaugeRegistry::new();
        let sources = [source(&[("env", "prod")]), source(&[("env", "dev")])];
        let handle = registry.ensure_gauge("docs", "Documents", &sources).unwrap();

        let err = registry.set_value(&handle, Some(&labels(&[("region", "eu")])), 1.0).unwrap_err();
        assert_eq!(err.metric, "docs");
        assert_eq!(err.expected, ["env".to_string()]);
        assert!(err.to_string().contains("[region]"));

        assert!(registry.set_value(&handle, None, 1.0).is_err());
        assert!(
            registry
                .set_value(&handle, Some(&labels(&[("env", "prod"), ("region", "eu")])), 1.0)
                .is_err()
        );
    }

    #[test]
    fn test_invalid_metric_name_is_an_error() {
        let mut registry = GaugeRegistry::new();
        assert!(registry.ensure_gauge("not a metric name", "x", &[source(&[])]).is_err());
        assert_eq!(registry.gauge_count(), 0);
    }
}
