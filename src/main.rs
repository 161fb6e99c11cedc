use chrono::Utc;
use clap::Parser as _;
use inspection_ranker::config::load_config;
use inspection_ranker::geocode::MapQuestGeocoder;
use inspection_ranker::parser::VchaParser;
use inspection_ranker::pipeline::Pipeline;
use inspection_ranker::scraper::ScraperImpl;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
#[command(name = "inspection-ranker", about = "Ranks restaurants by food-safety infractions")]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = "config.json")]
    config: String,
    /// Re-scrape the listing and refetch every detail page
    #[arg(long)]
    refetch: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let scraper = match ScraperImpl::new(&config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let parser = match VchaParser::new() {
        Ok(p) => Arc::new(p),
        Err(e) => {
            error!("Failed to build page parser: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let api_key = config.geocoder_api_key.clone().unwrap_or_default();
    if api_key.is_empty() {
        warn!("No geocoder API key configured; only cached addresses will resolve");
    }
    let geocoder = match MapQuestGeocoder::new(api_key) {
        Ok(g) => Arc::new(g),
        Err(e) => {
            error!("Failed to build geocoder: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = Pipeline::new(config, scraper, parser, geocoder);
    match pipeline.run(cli.refetch, Utc::now().date_naive()).await {
        Ok(outcome) => {
            info!(
                "Fetched {} detail pages ({} failed)",
                outcome.fetch.fetched, outcome.fetch.failed
            );
            print!("{}", outcome.report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
