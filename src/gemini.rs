//! Gemini generateContent client.
//!
//! Sends one HTTP POST per query and extracts the reply text from the
//! first candidate. Failures are logged and returned as error strings so
//! callers can record or speak them without special-casing.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::ApiConfig;

pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: &ApiConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client,
        }
    }

    /// Send one prompt and return the reply text.
    ///
    /// On HTTP 200 returns `candidates[0].content.parts[0].text`, or
    /// "No response." when the field is absent. Any other status or a
    /// transport failure yields an "Error: ..." string containing the
    /// status code or error, never a panic.
    pub async fn generate(&self, prompt: &str) -> String {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }]
        });

        debug!("Sending {} chars to model '{}'", prompt.len(), self.model);

        match self.client.post(&url).json(&body).send().await {
            Ok(resp) => {
                let status = resp.status();
                if !status.is_success() {
                    let text = resp.text().await.unwrap_or_default();
                    warn!("Gemini returned status {status}");
                    return format!("Error: {} - {text}", status.as_u16());
                }
                match resp.json::<serde_json::Value>().await {
                    Ok(data) => {
                        let reply = data["candidates"][0]["content"]["parts"][0]["text"]
                            .as_str()
                            .unwrap_or("No response.")
                            .to_string();
                        debug!("Received {} chars", reply.len());
                        reply
                    }
                    Err(e) => {
                        warn!("Failed to parse Gemini response: {e}");
                        format!("Error: {e}")
                    }
                }
            }
            Err(e) => {
                if e.is_connect() {
                    warn!("Cannot connect to Gemini at {}", self.base_url);
                } else if e.is_timeout() {
                    warn!("Gemini request timed out");
                } else {
                    warn!("Gemini request failed: {e}");
                }
                format!("Error: {e}")
            }
        }
    }
}
