//! Speaking one utterance at a time.
//!
//! [`UtterancePlayer::speak`] never fails: completion, engine errors, and
//! supersession all resolve to a [`SpeechOutcome`] the caller can log.

use crate::cancellation::CancellationToken;
use crate::error::{PlayerError, Result};
use crate::languages::same_primary_language;
use crate::sequencer::PlayToken;
use crate::voices::{VoiceCatalog, VoiceDescriptor};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Platform speech synthesis.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Voices known right now; may be empty until the platform is ready.
    fn voices(&self) -> Vec<VoiceDescriptor>;

    /// Receives a new list whenever the platform's voice set changes.
    fn voice_updates(&self) -> watch::Receiver<Vec<VoiceDescriptor>>;

    /// Speak and resolve once the audio has finished.
    async fn speak(&self, utterance: Utterance) -> Result<()>;

    /// Stop whatever is currently being spoken.
    fn cancel(&self);
}

/// What the engine is asked to say. `voice: None` means the engine default.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<VoiceDescriptor>,
    pub rate: f32,
}

/// A speak effect as produced by the sequencer, before voice resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceRequest {
    pub text: String,
    pub lang: String,
    pub voice_id: Option<String>,
    pub rate: f32,
    pub token: PlayToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    Completed,
    /// The engine reported an error; playback carries on as if it finished.
    Failed,
    /// Cancelled before or during speech.
    Superseded,
    /// Nothing to say.
    Skipped,
}

/// Requested id first, then the first voice sharing the language's primary
/// subtag, then the engine default.
pub fn resolve_voice(
    catalog: &VoiceCatalog,
    voice_id: Option<&str>,
    lang: &str,
) -> Option<VoiceDescriptor> {
    if let Some(id) = voice_id {
        if let Some(voice) = catalog.find(id) {
            return Some(voice.clone());
        }
        if !catalog.is_empty() {
            let err = PlayerError::VoiceUnavailable(id.to_string());
            warn!(lang, "{err}; falling back");
        }
    }
    catalog
        .list_voices()
        .iter()
        .find(|voice| same_primary_language(&voice.lang, lang))
        .cloned()
}

#[derive(Clone)]
pub struct UtterancePlayer {
    engine: Arc<dyn SpeechEngine>,
}

impl UtterancePlayer {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn SpeechEngine> {
        &self.engine
    }

    pub fn cancel(&self) {
        self.engine.cancel();
    }

    pub async fn speak(
        &self,
        request: UtteranceRequest,
        voice: Option<VoiceDescriptor>,
        cancel: CancellationToken,
    ) -> SpeechOutcome {
        if request.text.trim().is_empty() {
            return SpeechOutcome::Skipped;
        }
        if cancel.is_cancelled() {
            debug!(token = request.token.0, "Dropping superseded utterance");
            return SpeechOutcome::Superseded;
        }

        self.engine.cancel();
        let token = request.token.0;
        let utterance = Utterance {
            text: request.text,
            lang: request.lang,
            voice,
            rate: request.rate,
        };
        debug!(
            token,
            lang = %utterance.lang,
            voice = utterance.voice.as_ref().map(|voice| voice.id.as_str()),
            "Speaking"
        );

        tokio::select! {
            result = self.engine.speak(utterance) => match result {
                Ok(()) => SpeechOutcome::Completed,
                Err(err) => {
                    warn!(token, "Speech error treated as completion: {err}");
                    SpeechOutcome::Failed
                }
            },
            _ = cancel.cancelled() => {
                debug!(token, "Utterance superseded mid-speech");
                SpeechOutcome::Superseded
            }
        }
    }
}
