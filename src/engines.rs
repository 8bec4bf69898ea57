//! Speech backends for the terminal player.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use flashcards_core::cancellation::CancellationToken;
use flashcards_core::config::{AppConfig, SpeechBackend};
use flashcards_core::{PlayerError, SpeechEngine, Utterance, VoiceDescriptor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// `espeak-ng --voices` rows: priority, language, age/gender, name, file.
static VOICE_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s+(\S+)\s+\S+\s+(\S+)\s+(\S+)").unwrap());

const BASE_WPM: f32 = 175.0;

/// Pick the configured backend, falling back to silent playback when
/// espeak-ng cannot be started.
pub async fn select_engine(config: &AppConfig) -> Arc<dyn SpeechEngine> {
    match config.speech_backend {
        SpeechBackend::Silent => {
            info!("Using silent speech backend");
            Arc::new(SilentEngine::new())
        }
        SpeechBackend::Espeak => match EspeakEngine::probe(&config.espeak_path).await {
            Ok(engine) => {
                info!(
                    program = %config.espeak_path,
                    voices = engine.voices().len(),
                    "Using espeak-ng speech backend"
                );
                Arc::new(engine)
            }
            Err(err) => {
                warn!(
                    program = %config.espeak_path,
                    "espeak-ng unavailable; falling back to silent playback: {err:#}"
                );
                Arc::new(SilentEngine::new())
            }
        },
    }
}

pub struct EspeakEngine {
    program: String,
    updates: watch::Sender<Vec<VoiceDescriptor>>,
    current: Mutex<CancellationToken>,
}

impl EspeakEngine {
    pub async fn probe(program: &str) -> Result<Self> {
        let output = Command::new(program)
            .arg("--voices")
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Running `{program} --voices`"))?;
        if !output.status.success() {
            return Err(anyhow!("`{program} --voices` exited with {}", output.status));
        }
        let listing = String::from_utf8_lossy(&output.stdout);
        let voices = parse_voice_listing(&listing);
        debug!(count = voices.len(), "Parsed espeak-ng voices");
        let (updates, _) = watch::channel(voices);
        Ok(Self {
            program: program.to_string(),
            updates,
            current: Mutex::new(CancellationToken::new()),
        })
    }

    fn fresh_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Ok(mut current) = self.current.lock() {
            *current = token.clone();
        }
        token
    }
}

#[async_trait]
impl SpeechEngine for EspeakEngine {
    fn voices(&self) -> Vec<VoiceDescriptor> {
        self.updates.borrow().clone()
    }

    fn voice_updates(&self) -> watch::Receiver<Vec<VoiceDescriptor>> {
        self.updates.subscribe()
    }

    async fn speak(&self, utterance: Utterance) -> flashcards_core::Result<()> {
        let token = self.fresh_token();
        let voice = utterance
            .voice
            .as_ref()
            .map(|voice| voice.id.clone())
            .unwrap_or_else(|| utterance.lang.to_ascii_lowercase());
        let wpm = words_per_minute(utterance.rate);

        let mut child = Command::new(&self.program)
            .arg("-v")
            .arg(&voice)
            .arg("-s")
            .arg(wpm.to_string())
            .arg("--")
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| PlayerError::Speech(format!("spawning {}: {err}", self.program)))?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|err| PlayerError::Speech(err.to_string()))?;
                if status.success() {
                    Ok(())
                } else {
                    Err(PlayerError::Speech(format!("{} exited with {status}", self.program)))
                }
            }
            _ = token.cancelled() => {
                let _ = child.kill().await;
                Ok(())
            }
        }
    }

    fn cancel(&self) {
        if let Ok(current) = self.current.lock() {
            current.cancel();
        }
    }
}

/// Stand-in engine that only waits as long as speech roughly would.
pub struct SilentEngine {
    updates: watch::Sender<Vec<VoiceDescriptor>>,
}

impl SilentEngine {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self { updates }
    }
}

#[async_trait]
impl SpeechEngine for SilentEngine {
    fn voices(&self) -> Vec<VoiceDescriptor> {
        Vec::new()
    }

    fn voice_updates(&self) -> watch::Receiver<Vec<VoiceDescriptor>> {
        self.updates.subscribe()
    }

    async fn speak(&self, utterance: Utterance) -> flashcards_core::Result<()> {
        tokio::time::sleep(simulated_duration(&utterance.text, utterance.rate)).await;
        Ok(())
    }

    fn cancel(&self) {}
}

fn parse_voice_listing(listing: &str) -> Vec<VoiceDescriptor> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| VOICE_ROW.captures(line))
        .map(|caps| {
            let lang = canonical_tag(&caps[1]);
            let name = caps[2].replace('_', " ");
            VoiceDescriptor::new(&caps[3], name, lang)
        })
        .collect()
}

/// `en-gb` becomes `en-GB`; anything without a two-letter region is kept.
fn canonical_tag(raw: &str) -> String {
    match raw.split_once('-') {
        Some((primary, region)) if region.len() == 2 => {
            format!("{}-{}", primary.to_ascii_lowercase(), region.to_ascii_uppercase())
        }
        _ => raw.to_string(),
    }
}

fn words_per_minute(rate: f32) -> u32 {
    (BASE_WPM * rate).round().clamp(80.0, 450.0) as u32
}

fn simulated_duration(text: &str, rate: f32) -> Duration {
    let chars = text.chars().count() as f32;
    let secs = (chars * 0.06 / rate.max(0.1)).max(0.3);
    Duration::from_secs_f32(secs)
}
