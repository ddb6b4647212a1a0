//! API service monitor Server Entry Point

use apimon::cli::{Cli, Commands};
use apimon::config::{get_env_with_fallback_or, get_env_with_fallback_parse, MonitorConfig};
use apimon::{bootstrap, logging, server};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Clone)]
struct ServerConfig {
    host: String,
    port: u16,
    config_path: Option<PathBuf>,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = get_env_with_fallback_or("APIMON_HOST", "HOST", apimon::config::DEFAULT_HOST);
        let port = get_env_with_fallback_parse("APIMON_PORT", "PORT", apimon::config::DEFAULT_PORT);
        Self {
            host,
            port,
            config_path: None,
        }
    }

    fn from_args(host: String, port: u16, config_path: Option<PathBuf>) -> Self {
        Self {
            host,
            port,
            config_path,
        }
    }

    fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Error: failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    match cli.command {
        Some(Commands::Check(args)) => match apimon::cli::check::execute(&args).await {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Some(Commands::Serve(args)) => {
            run_server(ServerConfig::from_args(args.host, args.port, args.config)).await;
        }
        None => {
            run_server(ServerConfig::from_env()).await;
        }
    }
}

async fn run_server(config: ServerConfig) {
    info!("API Service Monitor v{}", env!("CARGO_PKG_VERSION"));

    let mut monitor_config = MonitorConfig::from_env();
    if config.config_path.is_some() {
        monitor_config.config_path = config.config_path.clone();
    }

    let context = match bootstrap::initialize(monitor_config).await {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to initialize monitor: {}", e);
            std::process::exit(1);
        }
    };

    let bind_addr = config.bind_addr();
    if let Err(e) = server::run(context.state, &bind_addr).await {
        error!("Server error on {}: {}", bind_addr, e);
        std::process::exit(1);
    }

    for handle in context.scheduler_handles {
        if let Err(e) = handle.await {
            error!("Scheduler task did not stop cleanly: {}", e);
        }
    }
}
