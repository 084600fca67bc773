//! research-once: one-shot topic research to Markdown and CSV.
//!
//! Runs the templated query battery for a single topic, carrying the
//! conversation forward between queries, and writes one dated report
//! pair into the output directory.

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gemini_research::config::Config;
use gemini_research::gemini::GeminiClient;
use gemini_research::history::{ConversationHistory, Turn};
use gemini_research::prompt;
use gemini_research::report;

#[derive(Parser, Debug)]
#[command(name = "research-once", about = "One-shot topic research to Markdown/CSV")]
struct Args {
    /// Topic to research, e.g. a species name
    #[arg(default_value = "Passer domesticus")]
    topic: String,

    /// Output directory
    #[arg(short, long, default_value = "~/research")]
    output: String,

    /// Path to research_config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info,hyper=warn,reqwest=warn"))
        .init();

    let config = Config::load(args.config.as_deref());
    let api_key = config.api.resolve_key()?;
    let client = GeminiClient::new(&config.api, api_key);

    let output_dir = if let Some(rest) = args.output.strip_prefix("~/") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest)
    } else {
        PathBuf::from(&args.output)
    };

    let date = Local::now().format("%Y-%m-%d").to_string();
    let mut history = ConversationHistory::new();
    let mut rows = Vec::new();

    for query in prompt::topic_queries(&args.topic) {
        info!("Researching: {query}");
        let full_prompt = if history.is_empty() {
            format!("Current query: {query}")
        } else {
            format!("{}\n\nCurrent query: {query}", history.render())
        };
        let response = client.generate(&full_prompt).await;
        history.push(query.clone(), response.clone());
        rows.push(Turn { query, response });
    }

    let markdown = report::build_topic_markdown(&args.topic, &rows);
    let csv = report::build_topic_csv(&rows);
    report::save_topic_reports(&output_dir, &args.topic, &date, &markdown, &csv)?;

    Ok(())
}
