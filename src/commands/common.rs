//! Pieces shared by the commands that load a configuration.

use crate::Result;
use crate::config::Config;
use crate::logging::{LogLevel, init_logging};
use camino::Utf8PathBuf;
use clap::Args;

/// Arguments for commands that read a configuration file
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to the configuration file (default is `config.yaml` in the current directory, then next to the executable)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Log level, overriding `exporter.loglevel` from the configuration
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl ConfigArgs {
    /// Locate and load the configuration, then set up logging from it.
    ///
    /// Load warnings are logged once the logger is up.
    pub fn load_and_init_logging(&self) -> Result<Config> {
        let path = Config::locate(self.config.as_ref())?;
        let (config, warnings) = Config::load(&path)?;

        let level = LogLevel::effective(self.log_level, config.exporter.loglevel);
        init_logging(level, config.exporter.logdir.as_deref())?;

        log::info!("loaded configuration from {path}");
        for warning in &warnings {
            log::warn!("{warning}");
        }

        Ok(config)
    }
}
