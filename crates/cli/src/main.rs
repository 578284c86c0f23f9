use clap::Parser;
use cname_finalizer_domain::CliOverrides;
use cname_finalizer_infrastructure::dns::DnsServerHandler;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "cname-finalizer")]
#[command(version)]
#[command(about = "DNS forwarder that flattens CNAME-only answers")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Metrics server port
    #[arg(short = 'm', long)]
    metrics_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream resolver (udp://IP:PORT, tcp://IP:PORT or IP:PORT); repeat for failover
    #[arg(short = 'u', long = "upstream", value_name = "ADDR")]
    upstream: Vec<String>,

    /// Maximum upstream lookups per CNAME chain
    #[arg(long)]
    max_lookup: Option<i64>,

    /// Value of the `server` label on exported metrics
    #[arg(long)]
    server_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        metrics_port: cli.metrics_port,
        bind_address: cli.bind,
        server_name: cli.server_name,
        upstream_servers: cli.upstream,
        max_lookup: cli.max_lookup,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging)?;

    info!("Starting cname-finalizer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        dns_port = config.server.dns_port,
        upstreams = ?config.upstream.servers,
        max_lookup = config.finalize.max_lookup,
        server = %config.server.server_label(),
        "Configuration loaded"
    );

    let services = di::FinalizerServices::new(&config)?;
    let shutdown = CancellationToken::new();

    let dns_addr: SocketAddr = config.server.dns_bind().parse()?;
    let metrics_addr: SocketAddr = config.server.metrics_bind().parse()?;

    let dns_handler = DnsServerHandler::new(
        Arc::clone(&services.use_case),
        config.server.server_label(),
        Duration::from_millis(config.server.request_timeout_ms),
        shutdown.clone(),
    );

    let dns_shutdown = shutdown.clone();
    let dns_task = tokio::spawn(async move {
        if let Err(e) = server::start_dns_server(dns_addr, dns_handler, dns_shutdown.clone()).await
        {
            error!(error = %e, "DNS server error");
            dns_shutdown.cancel();
        }
    });

    let web_shutdown = shutdown.clone();
    let web_task = tokio::spawn(async move {
        if let Err(e) =
            server::start_web_server(metrics_addr, services.metrics, web_shutdown.clone()).await
        {
            error!(error = %e, "Metrics server error");
            web_shutdown.cancel();
        }
    });

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Received shutdown signal"),
                Err(e) => warn!(error = %e, "Unable to listen for shutdown signal"),
            }
        }
        _ = shutdown.cancelled() => {}
    }

    shutdown.cancel();
    let _ = tokio::join!(dns_task, web_task);

    info!("Server shutdown complete");
    Ok(())
}
