//! Tweet search over the v1 endpoint.
//!
//! Usage: `pulse-search <QUERY> --from 2025-01-01 --to 2025-01-20`

use anyhow::Result;
use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use pulse_bot::AppConfig;
use pulse_upstream::{SearchClient, SearchQuery};

/// Search tweets mentioning a word or phrase
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Word or phrase to search for
    query: String,

    /// First day of the range (YYYY-MM-DD), default 7 days ago
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD), default today
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Configuration file path (can also be set via PULSE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, _) = AppConfig::load(args.config)?;
    pulse_telemetry::init_logging_with(&config.telemetry.filter())?;

    let to = args.to.unwrap_or_else(|| Utc::now().date_naive());
    let from = match args.from {
        Some(from) => from,
        None => to.checked_sub_days(Days::new(7)).unwrap_or(to),
    };
    let query = SearchQuery::new(args.query, from, to)?;

    let secrets = config.load_secrets()?;
    let client = SearchClient::new(&config.upstream.search_base_url, secrets.upstream_api_key)?;

    let results = client.search(&query).await?;
    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
