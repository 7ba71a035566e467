use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hls_relay::{
    config::Config,
    streaming::{PublicAddress, StreamInterceptor, sink_for},
    utils::{HttpUpstreamFetcher, UrlUtils},
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "hls-relay")]
#[command(version)]
#[command(about = "Transparent relay for HLS streams with track switch logging")]
#[command(long_about = None)]
struct Cli {
    /// Upstream base URL (overrides config file)
    #[arg(value_name = "BASE_URL")]
    base_url: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Host written into rewritten manifest URLs
    #[arg(long, value_name = "HOST")]
    public_host: Option<String>,

    /// Port written into rewritten manifest URLs (defaults to the listening port)
    #[arg(long, value_name = "PORT")]
    public_port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn apply_overrides(self, config: &mut Config) {
        if let Some(base_url) = self.base_url {
            config.upstream.base_url = base_url;
        }
        if let Some(host) = self.host {
            config.web.host = host;
        }
        if let Some(port) = self.port {
            config.web.port = port;
        }
        if let Some(public_host) = self.public_host {
            config.relay.public_host = public_host;
        }
        if let Some(public_port) = self.public_port {
            config.relay.public_port = Some(public_port);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries the relay event log
    let log_filter = if cli.log_level == "trace" {
        format!("hls_relay={},tower_http=trace", cli.log_level)
    } else {
        format!("hls_relay={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting HLS Relay v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(Some(&cli.config))?;
    cli.apply_overrides(&mut config);

    let base_url = config.base_url()?;
    let public = PublicAddress::new(config.relay.public_host.clone(), config.public_port());
    info!(
        "Relaying {} as http://{}:{}",
        UrlUtils::obfuscate_credentials(base_url.as_str()),
        public.host,
        public.port
    );

    let fetcher = HttpUpstreamFetcher::new(&config.upstream)?;
    let interceptor = Arc::new(StreamInterceptor::new(
        base_url,
        public,
        Arc::new(fetcher),
        sink_for(config.relay.event_output),
    ));

    WebServer::new(config.listen_addr()?, interceptor)
        .serve()
        .await
}
