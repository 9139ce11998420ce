//! Log setup: `env_logger` writing to stderr, optionally mirrored into a size-rotated file.

use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::ValueEnum;
use ohno::IntoAppError;
use serde::Deserialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use strum::EnumString;

/// Name of the log file created inside the configured log directory
pub const LOG_FILE_NAME: &str = "es-query-exporter.log";

/// Size at which the log file is rotated
pub const MAX_LOG_FILE_BYTES: u64 = 1_000_000;

/// Log level for diagnostic output
///
/// Parsing is case-insensitive and also accepts the `warning` and `critical` spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, EnumString, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String")]
pub enum LogLevel {
    /// No logging output
    #[strum(serialize = "none")]
    None,

    /// Only error messages
    #[strum(serialize = "error", serialize = "critical")]
    Error,

    /// Warning and error messages
    #[strum(serialize = "warn", serialize = "warning")]
    Warn,

    /// Info, warning, and error messages
    #[strum(serialize = "info")]
    Info,

    /// Debug, info, warning, and error messages
    #[strum(serialize = "debug")]
    Debug,

    /// Trace, debug, info, warning, and error messages
    #[strum(serialize = "trace")]
    Trace,
}

impl TryFrom<String> for LogLevel {
    type Error = strum::ParseError;

    fn try_from(value: String) -> core::result::Result<Self, strum::ParseError> {
        value.trim().parse()
    }
}

impl LogLevel {
    /// Pick the effective level: command line first, then configuration, then `info`.
    #[must_use]
    pub fn effective(cli: Option<Self>, config: Option<Self>) -> Self {
        cli.or(config).unwrap_or(Self::Info)
    }

    const fn filter(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Error => Some("error"),
            Self::Warn => Some("warn"),
            Self::Info => Some("info"),
            Self::Debug => Some("debug"),
            Self::Trace => Some("trace"),
        }
    }
}

/// Initialize the global logger.
///
/// Lines look like `2024-05-01T10:00:00Z :: INFO :: message`. When `logdir` is given, every line is
/// written both to stderr and to `<logdir>/es-query-exporter.log`.
pub fn init_logging(level: LogLevel, logdir: Option<&Utf8Path>) -> Result<()> {
    let Some(filter) = level.filter() else {
        return Ok(());
    };

    let mut builder = filtered_builder(env_logger::Env::default(), filter);
    let _ = builder.format(|buf, record| writeln!(buf, "{} :: {} :: {}", buf.timestamp(), record.level(), record.args()));

    if let Some(dir) = logdir {
        fs::create_dir_all(dir).into_app_err_with(|| format!("creating log directory {dir}"))?;
        let path = dir.join(LOG_FILE_NAME);
        let file = RotatingFile::open(path.clone(), MAX_LOG_FILE_BYTES).into_app_err_with(|| format!("opening log file {path}"))?;
        let _ = builder.target(env_logger::Target::Pipe(Box::new(StderrTee { file })));
    }

    builder.try_init().into_app_err("initializing logger")
}

/// Logger builder that takes `RUST_LOG` from `env` and then applies `filter` on top.
///
/// `RUST_LOG` may add per-module directives, but the chosen level always sets the default.
fn filtered_builder(env: env_logger::Env<'_>, filter: &str) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(env);
    let _ = builder.parse_filters(filter);
    builder
}

/// Append-only file that is moved aside to `<name>.1` once it would grow past a size limit.
///
/// Only one backup is kept; an older backup is replaced on each rotation.
#[derive(Debug)]
pub struct RotatingFile {
    path: Utf8PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
}

impl RotatingFile {
    pub fn open(path: Utf8PathBuf, max_bytes: u64) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            file,
            written,
            max_bytes,
        })
    }

    #[must_use]
    pub fn backup_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{}.1", self.path))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        fs::rename(&self.path, self.backup_path())?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }

        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Writes everything to stderr as well as to the log file.
#[derive(Debug)]
struct StderrTee {
    file: RotatingFile,
}

impl Write for StderrTee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // a broken stderr must not stop file logging
        let _ = io::stderr().write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        self.file.flush()
    }
}
