use super::{ConfigArgs, Host};
use crate::Result;
use crate::metrics::serve;
use crate::query::ElasticsearchClient;
use crate::refresh::RefreshCycle;
use clap::Parser;
use core::net::{IpAddr, Ipv4Addr, SocketAddr};
use core::time::Duration;
use ohno::IntoAppError;
use std::io::Write;

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Address the metrics endpoint binds to
    #[arg(long, value_name = "ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            common: ConfigArgs::default(),
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }
}

/// Serve metrics and refresh them until interrupted with Ctrl-C.
pub async fn run_exporter<H: Host>(host: &mut H, args: &RunArgs) -> Result<()> {
    let config = args.common.load_and_init_logging()?;

    let client = ElasticsearchClient::new(Duration::from_secs(config.exporter.timeout))?;
    let mut cycle = RefreshCycle::new(client, &config);

    let (local, server) = serve(cycle.gauges().registry(), SocketAddr::new(args.bind, config.exporter.port)).await?;
    let _ = writeln!(host.output(), "Serving metrics on http://{local}/metrics");

    tokio::select! {
        () = cycle.run_forever() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.into_app_err("waiting for Ctrl-C")?;
            log::info!("interrupted, shutting down");
        }
    }

    server.abort();
    Ok(())
}
