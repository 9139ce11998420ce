use super::Host;
use crate::Result;
use crate::config::{DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_YAML};
use camino::Utf8PathBuf;
use clap::Parser;
use ohno::{IntoAppError, bail};
use std::fs;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output configuration file path (default is `config.yaml` in the current directory)
    #[arg(value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Overwrite the file if it already exists
    #[arg(long)]
    pub force: bool,
}

pub fn init_config<H: Host>(host: &mut H, args: &InitArgs) -> Result<()> {
    let output = args.output.clone().unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CONFIG_FILE));

    if output.exists() && !args.force {
        bail!("{output} already exists, use --force to overwrite it");
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory {parent}"))?;
    }

    fs::write(&output, DEFAULT_CONFIG_YAML).into_app_err_with(|| format!("writing {output}"))?;
    let _ = writeln!(host.output(), "Generated default configuration file: {output}");
    Ok(())
}
