//! gemini-chat: interactive REPL with optional spoken replies.
//!
//! Reads queries from stdin, sends them to Gemini with the robotic
//! system prompt and recent conversation history, prints the reply, and
//! speaks it through the configured TTS backend.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gemini_research::config::Config;
use gemini_research::gemini::GeminiClient;
use gemini_research::history::ConversationHistory;
use gemini_research::prompt;
use gemini_research::speech::{Backend, Speaker};

#[derive(Parser, Debug)]
#[command(name = "gemini-chat", about = "Interactive Gemini chat with spoken replies")]
struct Args {
    /// Path to research_config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Speech backend: espeak, cloud, or off (overrides config)
    #[arg(short, long)]
    speech: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .init();

    let config = Config::load(args.config.as_deref());
    let api_key = config.api.resolve_key()?;
    let client = GeminiClient::new(&config.api, api_key);

    let backend = match &args.speech {
        Some(name) => Backend::parse(name)
            .ok_or_else(|| format!("Unknown speech backend: {name}"))?,
        None => Backend::parse(&config.speech.backend).unwrap_or(Backend::Off),
    };
    let speaker = Speaker::new(&config.speech, backend);

    let mut history = ConversationHistory::new();
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    println!("Enter your questions for Gemini (type 'exit' to quit):");

    loop {
        print!("\nYou: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let query = line.trim().to_string();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        println!("\nGetting response from Gemini...");
        let full_prompt = prompt::chat_prompt(&history, &query);
        let response = client.generate(&full_prompt).await;
        println!("\nGemini: {response}");

        history.push(query, response.clone());

        if speaker.is_enabled() {
            println!("\nConverting response to speech...");
            speaker.speak(&response).await;
        }
    }

    Ok(())
}
