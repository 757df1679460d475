//! agentpulse - Entry Point
//!
//! `run` (default): scheduler plus HTTP surface until ctrl-c
//! `once`: a single cycle, printed as JSON
//! `watch`: poll a running instance with the refresh policy

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use pulse_api::{AnalysisClient, AnalysisResponse, Published, RefreshPolicy};
use pulse_bot::{AppConfig, Application};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// AI agent market signal analyzer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PULSE_CONFIG env var)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run cycles on the configured interval and serve the results
    Run,
    /// Run one cycle and print the response
    Once,
    /// Poll a running instance and print each update
    Watch {
        /// Server root of the running instance
        #[arg(long, default_value = "http://localhost:8080")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_path) = AppConfig::load(args.config)?;
    pulse_telemetry::init_logging_with(&config.telemetry.filter())?;

    info!("Starting agentpulse v{}", env!("CARGO_PKG_VERSION"));
    info!(config_path = %config_path, "Configuration loaded");

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            let secrets = config.load_secrets()?;
            let app = Application::new(config, secrets)?;
            app.run().await?;
        }
        Command::Once => {
            let secrets = config.load_secrets()?;
            let app = Application::new(config, secrets)?;
            app.run_once().await;
            match app.api_state().latest() {
                Some(Published::Analysis(response)) => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Some(Published::Failure(response)) => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                    bail!("{}", response.error);
                }
                None => bail!("cycle finished without publishing a result"),
            }
        }
        Command::Watch { url } => watch(&url).await?,
    }

    Ok(())
}

async fn watch(url: &str) -> Result<()> {
    let client = AnalysisClient::new(url, RefreshPolicy::default())?;
    let shutdown = CancellationToken::new();

    let token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
        }
        token.cancel();
    });

    client
        .poll(shutdown, |outcome| match outcome {
            Ok(response) => print_update(&response),
            Err(e) => warn!(error = %e, "Analysis unavailable after retries"),
        })
        .await;
    Ok(())
}

fn print_update(response: &AnalysisResponse) {
    println!("=== {} ===", response.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    for signal in &response.signals {
        println!("{} -> {}", signal.summary_line(), signal.liquidity_action);
    }
    for warning in response.warnings.iter().flatten() {
        println!("! {warning}");
    }
    println!("\n{}\n", response.ai_advice);
}
