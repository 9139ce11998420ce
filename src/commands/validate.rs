use super::Host;
use crate::Result;
use crate::config::Config;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `config.yaml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

fn validate_config_inner(config_path: Option<&Utf8PathBuf>) -> Result<(Utf8PathBuf, Config, Vec<String>)> {
    let path = Config::locate(config_path)?;
    let (config, warnings) = Config::load(&path)?;
    Ok((path, config, warnings))
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    match validate_config_inner(args.config.as_ref()) {
        Ok((path, config, warnings)) => {
            for warning in &warnings {
                let _ = writeln!(host.error(), "warning: {warning}");
            }

            let _ = writeln!(host.output(), "Configuration file is valid");
            let _ = writeln!(host.output(), "Config file: {path}");
            let _ = writeln!(
                host.output(),
                "{} requests, {} metrics, {} warnings",
                config.requests.len(),
                config.metrics.len(),
                warnings.len()
            );
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "Configuration validation failed: {e:#}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::TestHost;
    use crate::commands::init::{InitArgs, init_config};

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_default_config_is_valid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().join("config.yaml")).unwrap();

        let mut init_host = TestHost::new();
        let init_args = InitArgs {
            output: Some(config_path.clone()),
            force: false,
        };
        init_config(&mut init_host, &init_args).unwrap();

        let mut host = TestHost::new();
        let args = ValidateArgs { config: Some(config_path) };
        validate_config(&mut host, &args).unwrap();

        assert!(host.output_text().contains("Configuration file is valid"));
        assert!(host.error_text().is_empty(), "{}", host.error_text());
        assert_eq!(host.exit_code, None);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_warnings_are_reported() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().join("config.yaml")).unwrap();
        std::fs::write(
            &config_path,
            "exporter: { port: 9206, refresh: 30 }\nmetrics:\n  - m:\n      sources:\n        - nowhere: { export: count }\n",
        )
        .unwrap();

        let mut host = TestHost::new();
        validate_config(&mut host, &ValidateArgs { config: Some(config_path) }).unwrap();

        assert!(host.error_text().contains("warning: metric 'm' reads from request 'nowhere'"));
        assert!(host.output_text().contains("0 requests, 1 metrics, 1 warnings"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_yaml_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().join("config.yaml")).unwrap();
        std::fs::write(&config_path, "exporter: [unclosed\n").unwrap();

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });

        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert!(host.error_text().contains("Configuration validation failed"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_missing_extraction_mode_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().join("config.yaml")).unwrap();
        std::fs::write(
            &config_path,
            "exporter: { port: 9206, refresh: 30 }\nrequests:\n  - q: { server: localhost, action: count }\nmetrics:\n  - m:\n      sources:\n        - q: {}\n",
        )
        .unwrap();

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });

        assert!(result.is_err());
        assert!(host.error_text().contains("needs either 'export' or 'search'"), "{}", host.error_text());
    }
}
