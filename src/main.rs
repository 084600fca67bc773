//! gemini-research-rs: scheduled research agent for the Gemini API.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gemini_research::config::Config;
use gemini_research::gemini::GeminiClient;
use gemini_research::service::ResearchService;

#[derive(Parser, Debug)]
#[command(name = "gemini-research-rs", about = "Scheduled Gemini research agent")]
struct Args {
    /// Path to research_config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run every category once and exit instead of scheduling
    #[arg(long)]
    once: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug,hyper=info,reqwest=info")
    } else {
        EnvFilter::new("info,hyper=warn,reqwest=warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting research agent...");

    let config = Config::load(args.config.as_deref());
    info!(
        "Config loaded: {} categories, output {}",
        config.research.categories.len(),
        config.research.output_directory
    );

    // Missing API key is the one fatal startup error
    let api_key = config.api.resolve_key()?;
    let client = GeminiClient::new(&config.api, api_key);

    let mut service = ResearchService::new(config, client);
    if args.once {
        service.run_once().await?;
        info!("Single pass complete");
    } else {
        service.run().await?;
    }

    Ok(())
}
