use crate::Result;
use crate::logging::LogLevel;
use crate::metrics::label_schema;
use crate::query::Action;
use camino::{Utf8Path, Utf8PathBuf};
use core::fmt::Display;
use core::str::FromStr;
use ohno::{EnrichableExt, IntoAppError, app_err, bail};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use url::Url;

/// The default configuration YAML content, embedded from `default_config.yaml`
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../../default_config.yaml");

/// File name looked up when no configuration path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Label name to label value, ordered by name
pub type Labels = BTreeMap<String, String>;

const fn default_timeout() -> u64 {
    10
}

/// Process-level settings from the `exporter` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterSettings {
    /// Port the metrics endpoint listens on
    #[serde(deserialize_with = "number_or_string")]
    pub port: u16,

    /// Seconds to sleep between refresh cycles
    #[serde(deserialize_with = "number_or_string")]
    pub refresh: u64,

    /// Per-request timeout against the search backend, in seconds
    #[serde(default = "default_timeout", deserialize_with = "number_or_string")]
    pub timeout: u64,

    #[serde(default)]
    pub loglevel: Option<LogLevel>,

    /// Directory for the rotating log file; logs go to stderr only when absent
    #[serde(default)]
    pub logdir: Option<Utf8PathBuf>,
}

/// A named query against the search backend.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDefinition {
    pub name: String,

    /// Backend hosts, tried in order until one answers
    pub servers: Vec<Url>,

    pub action: Action,

    /// Index (or index pattern, or date-math template) the action targets
    pub index: Option<String>,

    /// Free-form JSON request body
    pub body: Option<serde_json::Value>,

    /// Named arguments, sent as query-string parameters
    pub args: serde_json::Map<String, serde_json::Value>,
}

/// How a source locates its value inside a query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Follow a dotted path such as `hits.total.value`
    Path(String),

    /// Take the first value stored under this key anywhere in the result
    Search(String),
}

/// One query-result-to-value binding feeding a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Name of the query whose result is read
    pub query: String,
    pub extraction: Extraction,
    pub labels: Option<Labels>,
}

/// A gauge and the sources that feed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDefinition {
    pub name: String,
    pub description: String,
    pub sources: Vec<SourceSpec>,
}

impl MetricDefinition {
    /// Whether values of this metric are partitioned by labels.
    #[must_use]
    pub const fn is_labelled(&self) -> bool {
        self.sources.len() > 1
    }
}

/// The whole exporter configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub exporter: ExporterSettings,
    pub requests: Vec<QueryDefinition>,
    pub metrics: Vec<MetricDefinition>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    exporter: ExporterSettings,

    #[serde(default)]
    requests: Vec<serde_yaml::Mapping>,

    #[serde(default)]
    metrics: Vec<serde_yaml::Mapping>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServerList {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRequest {
    server: ServerList,
    action: Action,

    #[serde(default)]
    index: Option<String>,

    #[serde(default)]
    body: Option<serde_json::Value>,

    #[serde(default)]
    args: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMetric {
    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    sources: Vec<serde_yaml::Mapping>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSource {
    #[serde(default)]
    export: Option<String>,

    #[serde(default)]
    search: Option<String>,

    #[serde(default)]
    labels: Option<BTreeMap<String, serde_yaml::Value>>,
}

impl Config {
    /// Find the configuration file to use.
    ///
    /// An explicit path always wins. Otherwise `config.yaml` is looked up in the current directory and
    /// then next to the running executable.
    pub fn locate(explicit: Option<&Utf8PathBuf>) -> Result<Utf8PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.clone());
        }

        let local = Utf8PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Ok(local);
        }

        let exe = std::env::current_exe().into_app_err("locating the running executable")?;
        let beside_exe = exe
            .parent()
            .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
            .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
            .filter(|p| p.is_file());

        beside_exe.ok_or_else(|| app_err!("no {DEFAULT_CONFIG_FILE} found in the current directory or next to the executable"))
    }

    /// Load configuration from a file
    ///
    /// Returns the configuration along with non-fatal warnings about questionable content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load(path: &Utf8Path) -> Result<(Self, Vec<String>)> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => bail!("configuration file {path} does not exist"),
            Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration from {path}")),
        };

        Self::from_yaml(&text).map_err(|e| e.enrich_with(|| format!("loading configuration from {path}")))
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(text: &str) -> Result<(Self, Vec<String>)> {
        let raw: RawConfig = serde_yaml::from_str(text).into_app_err("parsing YAML configuration")?;

        let mut requests = Vec::new();
        for entry in raw.requests {
            for (name, params) in entry {
                let name = scalar_text(&name).ok_or_else(|| app_err!("request names must be strings, found {name:?}"))?;
                requests.push(parse_request(name, params)?);
            }
        }

        let mut metrics = Vec::new();
        for entry in raw.metrics {
            for (name, params) in entry {
                let name = scalar_text(&name).ok_or_else(|| app_err!("metric names must be strings, found {name:?}"))?;
                metrics.push(parse_metric(name, params)?);
            }
        }

        let config = Self {
            exporter: raw.exporter,
            requests,
            metrics,
        };

        let mut warnings = Vec::new();
        config.validate(&mut warnings)?;
        Ok((config, warnings))
    }

    /// Check cross-entry consistency.
    ///
    /// Hard problems are returned as errors, questionable ones are appended to `warnings`.
    fn validate(&self, warnings: &mut Vec<String>) -> Result<()> {
        if self.exporter.refresh == 0 {
            bail!("exporter.refresh must be at least 1 second");
        }

        if self.exporter.timeout == 0 {
            bail!("exporter.timeout must be at least 1 second");
        }

        let mut request_names = HashSet::new();
        for request in &self.requests {
            if !request_names.insert(request.name.as_str()) {
                bail!("request '{}' is declared more than once", request.name);
            }
        }

        let mut metric_names = HashSet::new();
        for metric in &self.metrics {
            if !metric_names.insert(metric.name.as_str()) {
                warnings.push(format!(
                    "metric '{}' is declared more than once; later declarations feed the first declaration's gauge",
                    metric.name
                ));
            }

            if metric.sources.is_empty() {
                warnings.push(format!("metric '{}' has no sources and will never be exported", metric.name));
            }

            for source in &metric.sources {
                if !request_names.contains(source.query.as_str()) {
                    warnings.push(format!(
                        "metric '{}' reads from request '{}', which is not declared",
                        metric.name, source.query
                    ));
                }
            }

            if metric.is_labelled()
                && let Some(schema) = label_schema(&metric.sources)
            {
                for source in &metric.sources {
                    let names: Vec<&str> = source.labels.iter().flat_map(|l| l.keys().map(String::as_str)).collect();
                    if names != schema.iter().map(String::as_str).collect::<Vec<_>>() {
                        warnings.push(format!(
                            "metric '{}' uses labels [{}], but its source '{}' has labels [{}]",
                            metric.name,
                            schema.join(", "),
                            source.query,
                            names.join(", ")
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

fn parse_request(name: String, params: serde_yaml::Value) -> Result<QueryDefinition> {
    let raw: RawRequest = serde_yaml::from_value(params).into_app_err_with(|| format!("parsing request '{name}'"))?;

    let hosts = match raw.server {
        ServerList::One(host) => vec![host],
        ServerList::Many(hosts) => hosts,
    };

    if hosts.is_empty() {
        bail!("request '{name}' does not name any server");
    }

    let servers = hosts
        .iter()
        .map(|host| parse_server(host).map_err(|e| e.enrich_with(|| format!("parsing server of request '{name}'"))))
        .collect::<Result<Vec<_>>>()?;

    Ok(QueryDefinition {
        name,
        servers,
        action: raw.action,
        index: raw.index,
        body: raw.body,
        args: raw.args,
    })
}

/// Parse a backend host, defaulting to plain HTTP when no scheme is given.
fn parse_server(host: &str) -> Result<Url> {
    let host = host.trim();
    let url = if host.contains("://") {
        Url::parse(host)
    } else {
        Url::parse(&format!("http://{host}"))
    }
    .into_app_err_with(|| format!("invalid server address '{host}'"))?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!("unsupported scheme '{}' in server address '{host}'", url.scheme());
    }

    Ok(url)
}

fn parse_metric(name: String, params: serde_yaml::Value) -> Result<MetricDefinition> {
    let raw: RawMetric = serde_yaml::from_value(params).into_app_err_with(|| format!("parsing metric '{name}'"))?;

    let mut sources = Vec::new();
    for entry in raw.sources {
        for (query, params) in entry {
            let query = scalar_text(&query).ok_or_else(|| app_err!("source names of metric '{name}' must be strings"))?;
            sources.push(parse_source(&name, query, params)?);
        }
    }

    let description = raw.description.filter(|d| !d.trim().is_empty()).unwrap_or_else(|| name.clone());

    Ok(MetricDefinition {
        name,
        description,
        sources,
    })
}

fn parse_source(metric: &str, query: String, params: serde_yaml::Value) -> Result<SourceSpec> {
    let raw: RawSource =
        serde_yaml::from_value(params).into_app_err_with(|| format!("parsing source '{query}' of metric '{metric}'"))?;

    let extraction = match (raw.export, raw.search) {
        (Some(path), None) => Extraction::Path(path),
        (None, Some(key)) => Extraction::Search(key),
        (Some(_), Some(_)) => bail!("source '{query}' of metric '{metric}' sets both 'export' and 'search'"),
        (None, None) => bail!("source '{query}' of metric '{metric}' needs either 'export' or 'search'"),
    };

    let labels = raw
        .labels
        .map(|labels| {
            labels
                .into_iter()
                .map(|(label, value)| {
                    scalar_text(&value)
                        .map(|value| (label.clone(), value))
                        .ok_or_else(|| app_err!("label '{label}' of source '{query}' in metric '{metric}' must be a scalar"))
                })
                .collect::<Result<Labels>>()
        })
        .transpose()?;

    Ok(SourceSpec { query, extraction, labels })
}

/// Text form of a YAML scalar; `None` for null, sequences, and mappings.
fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept either a YAML integer or a string holding one.
fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + TryFrom<u64>,
    <T as FromStr>::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => T::try_from(n)
            .ok()
            .ok_or_else(|| D::Error::custom(format!("{n} is out of range"))),
        NumberOrString::String(s) => s.trim().parse().map_err(D::Error::custom),
    }
}
