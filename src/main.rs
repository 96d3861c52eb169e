use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use secrets_router::{
    api::{start_api_server, ApiState, ServiceInfo},
    config::load_config,
    observability::{init_observability, log_config_info, ReadinessMonitor},
    secrets::{BackendTransport, DaprTransport, SecretResolver},
    Result, APP_NAME, VERSION,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Namespace-scoped secret resolution proxy in front of a Dapr sidecar
#[derive(Parser, Debug)]
#[command(name = "secrets-router", version, about)]
struct Cli {
    /// Path to a TOML, YAML or JSON configuration file
    #[arg(short, long, env = "SECRETS_ROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the HTTP listen port
    #[arg(short, long)]
    port: Option<u16>,
}

/// Exit status for configuration and validation failures
const EXIT_CONFIG: i32 = 2;

#[tokio::main]
async fn main() {
    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before any config is read from environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("\nError: {}\n", e);
        let code = if e.is_fatal_at_startup() { EXIT_CONFIG } else { 1 };
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
        config.validate()?;
    }

    init_observability(&config.observability)?;
    info!(app_name = APP_NAME, version = VERSION, "Starting secrets router");
    log_config_info(&config);

    let chain = config.backend_chain()?;
    let transport: Arc<dyn BackendTransport> =
        Arc::new(DaprTransport::from_config(&config.transport, chain.clone())?);
    let resolver = SecretResolver::new(chain, transport.clone());

    let monitor = ReadinessMonitor::new(transport, config.readiness.probe_interval());
    let state = ApiState::new(
        resolver,
        monitor.handle(),
        ServiceInfo::new(
            config.observability.service_name.clone(),
            config.observability.service_version.clone(),
        ),
    );

    let shutdown = CancellationToken::new();
    let monitor_task = tokio::spawn(monitor.run(shutdown.clone()));

    let result = start_api_server(&config.server, state, shutdown.clone()).await;
    if let Err(e) = &result {
        error!(error = %e, "API server terminated with error");
    }

    shutdown.cancel();
    if let Err(e) = monitor_task.await {
        error!(error = %e, "Readiness monitor task failed");
    }

    info!("Secrets router stopped");
    result
}
