//! cyclone-impact - Cyclone impact predictions from your terminal or browser.
//!
//! A thin front-end for a remote prediction service: send a cyclone's
//! position, get back predicted impact per locality, render it as a table.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

mod cli;
mod client;
mod errors;
mod form;
mod models;
mod server;
#[cfg(test)]
mod stub;
mod table;

use cli::{Cli, Command};
use client::PredictClient;
use form::{ErrorPolicy, FormController, SubmitOutcome};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;

    match cli.command {
        Command::Predict(args) => runtime.block_on(cmd_predict(args)),
        Command::Ui(args) => runtime.block_on(cmd_ui(args)),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `predict` command - one request, one table.
async fn cmd_predict(args: cli::PredictArgs) -> Result<()> {
    let client = PredictClient::new(&args.service.client_config())
        .context("failed to create prediction client")?;

    let mut form = FormController::new(ErrorPolicy::Visible);
    form.set_latitude(args.lat);
    form.set_longitude(args.lon);
    form.set_severity(args.severity);

    if form::submit(&mut form, &client).await != SubmitOutcome::Applied {
        let reason = form.last_error().unwrap_or("prediction request failed");
        anyhow::bail!("{reason} ({})", client.endpoint());
    }

    if form.results().is_empty() {
        tracing::info!("no localities returned");
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    table::write_records(&mut handle, form.results(), args.format)?;

    Ok(())
}

/// Execute the `ui` command - start web server.
async fn cmd_ui(args: cli::UiArgs) -> Result<()> {
    let client = PredictClient::new(&args.service.client_config())
        .context("failed to create prediction client")?;

    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        error_policy: if args.silent_errors {
            ErrorPolicy::Silent
        } else {
            ErrorPolicy::Visible
        },
    };

    // Print startup message
    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m🌀 Cyclone Impact Predictor\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  API:     {}", client.endpoint());
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    server::run_server(config, client).await
}
