//! Command-line interface and orchestration for es-query-exporter
//!
//! # Implementation Model
//!
//! The module is organized around four commands:
//!
//! - **run**: Load the configuration, start the `/metrics` endpoint, and refresh gauges until
//!   interrupted. This is what runs when no command is given.
//! - **once**: Run a single refresh cycle and print the metrics text, handy when writing a new
//!   configuration
//! - **init**: Write the default configuration file
//! - **validate**: Load a configuration file and report errors and warnings
//!
//! The `run` function parses command-line arguments using clap and routes to the appropriate
//! command handler. All output goes through a [`Host`] so commands can be exercised in tests.

mod common;
mod host;
mod init;
mod once;
mod run;
mod serve;
mod validate;

pub use common::ConfigArgs;
pub use host::Host;
#[cfg(test)]
pub use host::TestHost;
pub use init::{InitArgs, init_config};
pub use once::{OnceArgs, run_single_cycle};
pub use run::run;
pub use serve::{RunArgs, run_exporter};
pub use validate::{ValidateArgs, validate_config};
