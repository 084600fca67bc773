//! Research service orchestration.
//!
//! Registers one recurring job per category, runs every category once
//! immediately (concurrently), then polls for due jobs once a minute.
//! Schedule state lives in memory only; jobs missed while the process is
//! down are not run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::{CategoryConfig, Config};
use crate::gemini::GeminiClient;
use crate::history::{ConversationHistory, Turn};
use crate::prompt;
use crate::report;

/// Poll cadence for pending jobs.
const POLL_INTERVAL: Duration = Duration::from_secs(60);

struct Job {
    category: CategoryConfig,
    interval: Duration,
    next_run: Instant,
}

impl Job {
    fn is_due(&self, now: Instant) -> bool {
        now >= self.next_run
    }

    fn reschedule(&mut self, now: Instant) {
        self.next_run = now + self.interval;
    }
}

pub struct ResearchService {
    config: Config,
    client: Arc<GeminiClient>,
    base_dir: PathBuf,
    histories: HashMap<String, ConversationHistory>,
}

impl ResearchService {
    pub fn new(config: Config, client: GeminiClient) -> Self {
        let base_dir = config.research.base_dir();
        Self {
            config,
            client: Arc::new(client),
            base_dir,
            histories: HashMap::new(),
        }
    }

    /// Run every category once, concurrently, and return.
    pub async fn run_once(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.setup_directories()?;
        self.initial_pass().await;
        Ok(())
    }

    /// Run forever: immediate pass, then the once-a-minute poll loop.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.setup_directories()?;

        let mut jobs = self.register_jobs();
        info!(
            "Scheduled {} of {} categories",
            jobs.len(),
            self.config.research.categories.len()
        );

        self.initial_pass().await;

        let mut poll = tokio::time::interval(POLL_INTERVAL);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        poll.tick().await; // first tick fires immediately

        loop {
            poll.tick().await;
            let now = Instant::now();
            for job in jobs.iter_mut().filter(|j| j.is_due(now)) {
                info!("Running scheduled research for '{}'", job.category.name);
                let history = self
                    .histories
                    .entry(job.category.name.clone())
                    .or_default();
                if let Err(e) =
                    run_category(&self.client, &self.base_dir, &job.category, history).await
                {
                    error!("Error researching {}: {e}", job.category.name);
                }
                job.reschedule(Instant::now());
            }
        }
    }

    fn setup_directories(&self) -> std::io::Result<()> {
        let names: Vec<String> = self
            .config
            .research
            .categories
            .iter()
            .map(|c| c.name.clone())
            .collect();
        report::ensure_directories(&self.base_dir, &names)
    }

    fn register_jobs(&self) -> Vec<Job> {
        let now = Instant::now();
        self.config
            .research
            .categories
            .iter()
            .filter_map(|category| match category.interval() {
                Some(interval) => {
                    info!(
                        "Registered '{}' every {}",
                        category.name, category.frequency
                    );
                    Some(Job {
                        category: category.clone(),
                        interval,
                        next_run: now + interval,
                    })
                }
                None => {
                    warn!(
                        "Invalid frequency '{}' for category '{}', not scheduling",
                        category.frequency, category.name
                    );
                    None
                }
            })
            .collect()
    }

    /// Run all categories once, each in its own task. Every task takes
    /// ownership of its category's history and hands it back on join, so
    /// there is no shared mutable state between categories.
    async fn initial_pass(&mut self) {
        let mut set = JoinSet::new();

        for category in self.config.research.categories.clone() {
            let client = self.client.clone();
            let base_dir = self.base_dir.clone();
            let mut history = self
                .histories
                .remove(&category.name)
                .unwrap_or_default();

            set.spawn(async move {
                if let Err(e) = run_category(&client, &base_dir, &category, &mut history).await {
                    error!("Error researching {}: {e}", category.name);
                }
                (category.name, history)
            });
        }

        while let Some(result) = set.join_next().await {
            match result {
                Ok((name, history)) => {
                    self.histories.insert(name, history);
                }
                Err(e) => error!("Research task panicked: {e}"),
            }
        }
    }
}

/// Drive one research run for a category: query the model for each canned
/// query, record the turns, and persist the Markdown/CSV pair.
pub async fn run_category(
    client: &GeminiClient,
    base_dir: &Path,
    category: &CategoryConfig,
    history: &mut ConversationHistory,
) -> std::io::Result<()> {
    let queries = category.effective_queries();
    if queries.is_empty() {
        warn!("Category '{}' has no queries, skipping", category.name);
        return Ok(());
    }

    let date = Local::now().format("%Y-%m-%d").to_string();
    let mut rows = Vec::with_capacity(queries.len());

    for query in &queries {
        info!("Researching {}: {query}", category.name);
        let full_prompt = prompt::research_prompt(&category.name, history, query);
        let response = client.generate(&full_prompt).await;
        history.push(query.clone(), response.clone());
        rows.push(Turn {
            query: query.clone(),
            response,
        });
    }

    let markdown = report::build_markdown(&category.name, &date, &rows);
    let csv = report::build_csv(&category.name, &date, &rows);
    report::save_reports(base_dir, &category.name, &date, &markdown, &csv)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_client(server: &MockServer) -> GeminiClient {
        let api = ApiConfig {
            base_url: server.uri(),
            timeout_secs: 5,
            ..ApiConfig::default()
        };
        GeminiClient::new(&api, "test-key".into())
    }

    async fn canned_server(reply: &str) -> MockServer {
        let server = MockServer::start().await;
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": reply}]}}]
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn run_category_writes_reports_and_grows_history() {
        let server = canned_server("analysis text").await;
        let client = mock_client(&server);
        let dir = tempfile::tempdir().unwrap();
        let category = CategoryConfig::new("technology", "12h");
        let mut history = ConversationHistory::new();

        run_category(&client, dir.path(), &category, &mut history)
            .await
            .unwrap();

        assert_eq!(history.len(), 5);
        assert_eq!(history.turns()[0].response, "analysis text");

        let date = Local::now().format("%Y-%m-%d").to_string();
        let md = dir
            .path()
            .join("technology/markdown")
            .join(report::markdown_filename(&date, "technology"));
        let csv = dir
            .path()
            .join("technology/csv")
            .join(report::csv_filename(&date, "technology"));
        assert!(md.is_file());
        assert!(csv.is_file());

        let md_text = std::fs::read_to_string(md).unwrap();
        assert!(md_text.contains("# Technology Research Report"));
        assert!(md_text.contains("analysis text"));
    }

    #[tokio::test]
    async fn unknown_category_without_queries_is_skipped() {
        let server = canned_server("unused").await;
        let client = mock_client(&server);
        let dir = tempfile::tempdir().unwrap();
        let category = CategoryConfig::new("astrology", "12h");
        let mut history = ConversationHistory::new();

        run_category(&client, dir.path(), &category, &mut history)
            .await
            .unwrap();

        assert!(history.is_empty());
        assert!(!dir.path().join("astrology").exists());
    }

    #[tokio::test]
    async fn history_stays_bounded_across_repeated_runs() {
        let server = canned_server("ok").await;
        let client = mock_client(&server);
        let dir = tempfile::tempdir().unwrap();
        let category = CategoryConfig::new("technology", "12h");
        let mut history = ConversationHistory::new();

        for _ in 0..4 {
            run_category(&client, dir.path(), &category, &mut history)
                .await
                .unwrap();
        }
        assert_eq!(history.len(), 10);
    }

    #[tokio::test]
    async fn run_once_covers_all_configured_categories() {
        let server = canned_server("initial pass").await;
        let dir = tempfile::tempdir().unwrap();

        let mut config = Config::default();
        config.research.output_directory = dir.path().to_string_lossy().into_owned();

        let mut service = ResearchService::new(config, mock_client(&server));
        service.run_once().await.unwrap();

        let date = Local::now().format("%Y-%m-%d").to_string();
        for category in ["technology", "market_trends", "industry_developments"] {
            let md = dir
                .path()
                .join(category)
                .join("markdown")
                .join(report::markdown_filename(&date, category));
            assert!(md.is_file(), "missing report for {category}");
            assert_eq!(service.histories[category].len(), 5);
        }
    }

    #[test]
    fn due_jobs_reschedule_by_their_interval() {
        let now = Instant::now();
        let mut job = Job {
            category: CategoryConfig::new("technology", "12h"),
            interval: Duration::from_secs(12 * 3600),
            next_run: now,
        };
        assert!(job.is_due(now));
        job.reschedule(now);
        assert!(!job.is_due(now));
        assert!(job.is_due(now + Duration::from_secs(12 * 3600)));
    }
}
