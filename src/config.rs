//! Configuration management for gemini-research-rs.
//!
//! Loads config from YAML files in standard locations, matching
//! the Python research_config.yaml format.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::prompt;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API key. Empty means read GEMINI_API_KEY from the environment.
    pub key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-2.0-flash-exp".into(),
            timeout_secs: 60,
        }
    }
}

impl ApiConfig {
    /// Resolve the API key from config or the GEMINI_API_KEY environment
    /// variable. A missing key is the one fatal startup error.
    pub fn resolve_key(&self) -> Result<String, String> {
        if !self.key.trim().is_empty() {
            return Ok(self.key.trim().to_string());
        }
        match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(
                "API key not found. Set api.key in the config file or the \
                 GEMINI_API_KEY environment variable."
                    .into(),
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub name: String,
    /// Update cadence: "<n>h" or "<n>d".
    pub frequency: String,
    /// Query battery. Empty means use the built-in battery for this name.
    pub queries: Vec<String>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            frequency: "24h".into(),
            queries: Vec::new(),
        }
    }
}

impl CategoryConfig {
    pub fn new(name: &str, frequency: &str) -> Self {
        Self {
            name: name.into(),
            frequency: frequency.into(),
            queries: Vec::new(),
        }
    }

    /// The effective query battery for this category.
    pub fn effective_queries(&self) -> Vec<String> {
        if self.queries.is_empty() {
            prompt::default_queries(&self.name)
        } else {
            self.queries.clone()
        }
    }

    /// Parse the frequency string into an interval. "12h" and "2d"
    /// style values only; anything else is rejected.
    pub fn interval(&self) -> Option<Duration> {
        let freq = self.frequency.trim();
        if let Some(hours) = freq.strip_suffix('h') {
            let n: u64 = hours.parse().ok()?;
            (n > 0).then(|| Duration::from_secs(n * 3600))
        } else if let Some(days) = freq.strip_suffix('d') {
            let n: u64 = days.parse().ok()?;
            (n > 0).then(|| Duration::from_secs(n * 86400))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    pub output_directory: String,
    pub categories: Vec<CategoryConfig>,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            output_directory: "~/research_reports".into(),
            categories: vec![
                CategoryConfig::new("technology", "12h"),
                CategoryConfig::new("market_trends", "24h"),
                CategoryConfig::new("industry_developments", "48h"),
            ],
        }
    }
}

impl ResearchConfig {
    /// Output directory with a leading `~` expanded to the home directory.
    pub fn base_dir(&self) -> PathBuf {
        expand_home(&self.output_directory)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// "espeak", "cloud", or "off".
    pub backend: String,
    pub language: String,
    /// Top-level domain for the cloud voice, e.g. "co.uk".
    pub accent: String,
    /// espeak-ng voice name.
    pub voice: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            backend: "off".into(),
            language: "en".into(),
            accent: "co.uk".into(),
            voice: "en-gb".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub research: ResearchConfig,
    pub speech: SpeechConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./research_config.yaml
    /// 2. ~/.config/gemini-research/config.yaml
    /// 3. /etc/gemini-research/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir()
                    .ok()
                    .map(|d| d.join("research_config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/gemini-research/config.yaml")),
                Some(PathBuf::from("/etc/gemini-research/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match serde_yml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_categories_and_cadences() {
        let config = Config::default();
        let names: Vec<&str> = config
            .research
            .categories
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["technology", "market_trends", "industry_developments"]
        );
        assert_eq!(config.research.categories[0].frequency, "12h");
        assert_eq!(config.research.categories[2].frequency, "48h");
    }

    #[test]
    fn interval_parses_hours_and_days() {
        let cat = CategoryConfig::new("technology", "12h");
        assert_eq!(cat.interval(), Some(Duration::from_secs(12 * 3600)));

        let cat = CategoryConfig::new("technology", "2d");
        assert_eq!(cat.interval(), Some(Duration::from_secs(2 * 86400)));
    }

    #[test]
    fn interval_rejects_garbage() {
        for bad in ["", "h", "12", "12w", "0h", "twelve-h", "-3h"] {
            let cat = CategoryConfig::new("technology", bad);
            assert_eq!(cat.interval(), None, "frequency {bad:?} should be rejected");
        }
    }

    #[test]
    fn loads_yaml_with_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api:\n  model: gemini-test\nresearch:\n  output_directory: /tmp/reports\n  categories:\n    - name: birds\n      frequency: 6h\n      queries:\n        - \"What is new with birds?\""
        )
        .unwrap();

        let config = Config::load(Some(file.path()));
        assert_eq!(config.api.model, "gemini-test");
        // Untouched fields keep their defaults
        assert_eq!(
            config.api.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.research.categories.len(), 1);
        assert_eq!(config.research.categories[0].name, "birds");
        assert_eq!(
            config.research.categories[0].effective_queries(),
            vec!["What is new with birds?".to_string()]
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/research_config.yaml")));
        assert_eq!(config.research.output_directory, "~/research_reports");
    }

    #[test]
    fn resolve_key_prefers_config_value() {
        let api = ApiConfig {
            key: "abc123".into(),
            ..ApiConfig::default()
        };
        assert_eq!(api.resolve_key().unwrap(), "abc123");
    }
}
