//! CLI module for apimon
//!
//! Provides command-line interface for the API service monitor.

pub mod check;
pub mod serve;

use clap::{Parser, Subcommand};

/// API service monitor - polls HTTP endpoints and flags slow or failing responses
#[derive(Parser, Debug)]
#[command(name = "apimon")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    APIMON_HOST                 Bind address (default: 0.0.0.0)
    APIMON_PORT                 Listen port (default: 3000)
    APIMON_CONFIG               Service config file (YAML or JSON)
    APIMON_SERVICES             Service list as a JSON array
    APIMON_REQUEST_TIMEOUT_MS   Per-check request timeout (default: 10000)
    APIMON_ROUND_MODE           parallel | sequential (default: parallel)
    APIMON_ALERT_WEBHOOK_URL    POST alert events to this URL
    APIMON_SCHEDULER_ENABLED    Run checks on each service interval
    APIMON_LOG_LEVEL            Log filter (default: info)
    APIMON_LOG_DIR              Also write JSON logs to this directory
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the monitor server
    Serve(serve::ServeArgs),
    /// Run a single monitoring round and print the results
    Check(check::CheckArgs),
}
