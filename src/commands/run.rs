//! Command dispatch logic for es-query-exporter

use super::{InitArgs, OnceArgs, RunArgs, ValidateArgs, init_config, run_exporter, run_single_cycle, validate_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "es-query-exporter", author, version, long_about = None)]
#[command(about = "Export Elasticsearch query results as Prometheus gauges")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve metrics, refreshing them periodically (the default)
    Run(RunArgs),
    /// Run one refresh cycle and print the metrics
    Once(OnceArgs),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// Without a subcommand the exporter runs with default arguments.
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let command = Cli::parse_from(args).command.unwrap_or_else(|| Command::Run(RunArgs::default()));

    match &command {
        Command::Run(run_args) => run_exporter(host, run_args).await,
        Command::Once(once_args) => run_single_cycle(host, once_args).await,
        Command::Init(init_args) => init_config(host, init_args),
        Command::Validate(validate_args) => validate_config(host, validate_args),
    }
}
