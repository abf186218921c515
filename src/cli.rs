//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::client::{ClientConfig, DEFAULT_ENDPOINT, REQUEST_TIMEOUT_SECS};
use crate::table::Format;

/// Cyclone impact predictions for coastal localities.
#[derive(Parser, Debug)]
#[command(name = "cyclone-impact")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Predict impact for one cyclone position and print the table
    Predict(PredictArgs),

    /// Start the web UI server
    Ui(UiArgs),
}

/// Where and how to reach the prediction service.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Prediction endpoint URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl ServiceArgs {
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let timeout = self.timeout.max(1);
        if timeout != self.timeout {
            tracing::warn!("request timeout clamped to minimum of 1 second");
        }

        ClientConfig {
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(timeout),
        }
    }
}

/// Arguments for the `predict` command.
#[derive(Parser, Debug)]
pub struct PredictArgs {
    /// Cyclone latitude (sent as typed)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: String,

    /// Cyclone longitude (sent as typed)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: String,

    /// Storm severity; omitted from the request unless given
    #[arg(long)]
    pub severity: Option<String>,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `ui` command.
#[derive(Parser, Debug)]
pub struct UiArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Only log failed predictions; show no error in the page
    #[arg(long)]
    pub silent_errors: bool,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}
