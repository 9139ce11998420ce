use super::{ConfigArgs, Host};
use crate::Result;
use crate::query::ElasticsearchClient;
use crate::refresh::RefreshCycle;
use chrono::Utc;
use clap::Parser;
use core::time::Duration;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct OnceArgs {
    #[command(flatten)]
    pub common: ConfigArgs,
}

/// Run a single refresh cycle and print the resulting metrics instead of serving them.
pub async fn run_single_cycle<H: Host>(host: &mut H, args: &OnceArgs) -> Result<()> {
    let config = args.common.load_and_init_logging()?;

    let client = ElasticsearchClient::new(Duration::from_secs(config.exporter.timeout))?;
    let mut cycle = RefreshCycle::new(client, &config);

    let report = cycle.run_once(Utc::now()).await;
    let text = cycle.render()?;

    let _ = write!(host.output(), "{text}");
    if report.query_failures > 0 || report.export.extraction_failures > 0 || report.export.config_errors > 0 {
        let _ = writeln!(
            host.error(),
            "{} of {} queries failed, {} values could not be extracted, {} values did not fit their labels",
            report.query_failures,
            report.queries,
            report.export.extraction_failures,
            report.export.config_errors
        );
    }

    Ok(())
}
