//! Spoken replies for the chat binary.
//!
//! Two backends: a local espeak-ng subprocess (WAV over stdout) and the
//! Google Translate TTS endpoint (MP3 over HTTP). Both are decoded and
//! played through a rodio Sink. Speech is best-effort: any failure logs
//! a warning and the conversation continues silently.

use std::io::Cursor;
use std::time::Duration;

use reqwest::Client;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tokio::process::Command;
use tracing::warn;

use crate::config::SpeechConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Espeak,
    Cloud,
    Off,
}

impl Backend {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "espeak" => Some(Self::Espeak),
            "cloud" => Some(Self::Cloud),
            "off" | "none" => Some(Self::Off),
            _ => None,
        }
    }
}

pub struct Speaker {
    backend: Backend,
    config: SpeechConfig,
    client: Client,
    // In rodio 0.21, OutputStream is the handle and must stay alive
    stream: Option<OutputStream>,
}

impl Speaker {
    /// Build a speaker for the requested backend. If the audio output
    /// cannot be opened the speaker degrades to `Off`.
    pub fn new(config: &SpeechConfig, backend: Backend) -> Self {
        let stream = if backend == Backend::Off {
            None
        } else {
            match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => Some(stream),
                Err(e) => {
                    warn!("Failed to open audio output: {e}, speech disabled");
                    None
                }
            }
        };

        let backend = if stream.is_none() { Backend::Off } else { backend };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            backend,
            config: config.clone(),
            client,
            stream,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend != Backend::Off
    }

    /// Speak the text aloud, blocking until playback finishes.
    pub async fn speak(&self, text: &str) {
        if self.backend == Backend::Off || text.trim().is_empty() {
            return;
        }

        let audio = match self.backend {
            Backend::Espeak => self.synthesize_espeak(text).await,
            Backend::Cloud => self.synthesize_cloud(text).await,
            Backend::Off => return,
        };

        match audio {
            Some(bytes) => self.play(bytes).await,
            None => warn!("Speech synthesis produced no audio"),
        }
    }

    /// Run espeak-ng and capture the WAV it writes to stdout.
    async fn synthesize_espeak(&self, text: &str) -> Option<Vec<u8>> {
        let output = Command::new("espeak-ng")
            .arg("--stdout")
            .arg("-v")
            .arg(&self.config.voice)
            .arg(text)
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() && !out.stdout.is_empty() => Some(out.stdout),
            Ok(out) => {
                warn!("espeak-ng exited with {}", out.status);
                None
            }
            Err(e) => {
                warn!("Failed to run espeak-ng: {e}");
                None
            }
        }
    }

    /// Fetch MP3 speech from the Google Translate TTS endpoint.
    async fn synthesize_cloud(&self, text: &str) -> Option<Vec<u8>> {
        let url = format!("https://translate.google.{}/translate_tts", self.config.accent);
        let result = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.config.language.as_str()),
                ("q", text),
            ])
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => match resp.bytes().await {
                Ok(bytes) if !bytes.is_empty() => Some(bytes.to_vec()),
                Ok(_) => {
                    warn!("Cloud TTS returned empty audio");
                    None
                }
                Err(e) => {
                    warn!("Failed to read cloud TTS audio: {e}");
                    None
                }
            },
            Ok(resp) => {
                warn!("Cloud TTS returned status {}", resp.status());
                None
            }
            Err(e) => {
                warn!("Cloud TTS request failed: {e}");
                None
            }
        }
    }

    /// Decode and play audio bytes, waiting for playback to finish.
    async fn play(&self, bytes: Vec<u8>) {
        let Some(stream) = &self.stream else {
            return;
        };

        let source = match Decoder::new(Cursor::new(bytes)) {
            Ok(source) => source,
            Err(e) => {
                warn!("Failed to decode audio: {e}");
                return;
            }
        };

        // rodio 0.21: Sink::connect_new takes &Mixer
        let sink = Sink::connect_new(stream.mixer());
        sink.append(source);

        let result = tokio::task::spawn_blocking(move || sink.sleep_until_end()).await;
        if let Err(e) = result {
            warn!("Playback task failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse() {
        assert_eq!(Backend::parse("espeak"), Some(Backend::Espeak));
        assert_eq!(Backend::parse("Cloud"), Some(Backend::Cloud));
        assert_eq!(Backend::parse("off"), Some(Backend::Off));
        assert_eq!(Backend::parse("none"), Some(Backend::Off));
        assert_eq!(Backend::parse("festival"), None);
    }
}
