//! # Kestrel DNS
//!
//! Caching DNS resolver with an HTTP control surface.

use clap::Parser;
use kestrel_dns_api::{create_api_routes, AppState};
use kestrel_dns_domain::CliOverrides;
use kestrel_dns_infrastructure::dns::ResolverService;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

mod bootstrap;

#[derive(Parser)]
#[command(name = "kestrel-dns")]
#[command(version)]
#[command(about = "A caching DNS resolver with upstream failover")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// DNS listener port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Web API port
    #[arg(short = 'w', long)]
    web_port: Option<u16>,

    /// Bind address for both listeners
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        dns_port: cli.dns_port,
        web_port: cli.web_port,
        bind_address: cli.bind,
        log_level: cli.log_level,
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    let web_listen = config.server.web_listen();
    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        dns = %config.server.dns_listen(),
        web = %web_listen,
        upstreams = config.resolver.upstreams.len(),
        "Kestrel DNS starting"
    );

    let service = Arc::new(ResolverService::new(config));
    service.start().await?;

    let app = axum::Router::new()
        .nest("/api", create_api_routes(AppState::new(service.clone())))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&web_listen).await?;
    info!("Web API ready at http://{}", web_listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = service.stop().await {
        error!(error = %e, "Shutdown: resolver was not running");
    }
    info!("Goodbye");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Ctrl+C received, shutting down");
    }
}
