//! Playback sequencing.
//!
//! [`Sequencer::handle`] is a pure transition: it mutates the owned state and
//! returns the effects the runtime must carry out. Timers and speech report
//! back as events tagged with the [`PlayToken`] they were issued under, so a
//! new cycle invalidates everything the previous one scheduled.

mod state;
mod transitions;

pub use state::{PlayToken, PlaybackPhase, SequencerState, TimerKind, Timings};

use crate::config::AppConfig;
use crate::deck::Deck;
use crate::languages::{
    LanguagePreferences, default_study_language, default_translation_language, ordered_options,
    resolve_speech_lang, translation_options,
};
use crate::playback::PlaybackConfig;
use crate::player::UtteranceRequest;
use crate::presenter::{RenderCommand, VoiceOption};
use crate::session::SessionSnapshot;
use crate::voices::{VoiceCatalog, VoiceDescriptor, VoiceRole};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    DeckLoaded { label: String, deck: Deck },
    DeckRejected { label: String, error: String },
    TogglePause,
    Restart,
    Next,
    SelectStudyLanguage(String),
    SelectTranslationLanguage(String),
    SelectStudyVoice(String),
    SelectTranslationVoice(String),
    SetSpeed(f32),
    SetPauseSecs(f32),
    SetRepeatCount(u32),
    SetShowTranslation(bool),
    ToggleWakeLock,
    VoicesChanged(Vec<VoiceDescriptor>),
    VisibilityHidden,
    Unload,
    SpeechFinished { token: PlayToken },
    TimerElapsed { token: PlayToken, timer: TimerKind },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEffect {
    /// Cancel everything from the previous cycle and start tracking `token`.
    BeginCycle { token: PlayToken },
    /// Cancel in-flight speech and timers without starting a new cycle.
    Halt,
    Render(RenderCommand),
    Speak(UtteranceRequest),
    StartTimer {
        token: PlayToken,
        timer: TimerKind,
        after: Duration,
    },
    SaveSession(SessionSnapshot),
    AcquireWakeLock,
    ReleaseWakeLock,
}

pub struct Sequencer {
    state: SequencerState,
    config: PlaybackConfig,
    deck: Option<Deck>,
    deck_label: Option<String>,
    catalog: VoiceCatalog,
    languages: LanguagePreferences,
    timings: Timings,
    /// Last snapshot handed to the store; decides whether a loaded deck
    /// resumes at its saved index.
    persisted: Option<SessionSnapshot>,
    wake_lock_on_load: bool,
    wake_lock_enabled: bool,
}

impl Sequencer {
    pub fn new(app_config: &AppConfig, restored: Option<SessionSnapshot>) -> Self {
        let config = restored
            .as_ref()
            .map(|snapshot| snapshot.config.clone().normalized())
            .unwrap_or_else(|| PlaybackConfig::from_app_config(app_config));
        Self {
            state: SequencerState::default(),
            config,
            deck: None,
            deck_label: None,
            catalog: VoiceCatalog::new(app_config.voice_preferences()),
            languages: app_config.language_preferences(),
            timings: app_config.timings(),
            persisted: restored,
            wake_lock_on_load: app_config.wake_lock_on_load,
            wake_lock_enabled: false,
        }
    }

    pub fn handle(&mut self, event: PlayerEvent) -> Vec<PlayerEffect> {
        transitions::transition(self, event)
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }

    pub fn deck_label(&self) -> Option<&str> {
        self.deck_label.as_deref()
    }

    pub fn wake_lock_enabled(&self) -> bool {
        self.wake_lock_enabled
    }

    fn is_live(&self, token: PlayToken) -> bool {
        token == self.state.token && !self.state.paused && self.deck.is_some()
    }

    fn cycle_active(&self) -> bool {
        self.deck.is_some() && !self.state.paused
    }

    fn snapshot(&mut self) -> SessionSnapshot {
        // Until a deck loads, the saved position belongs to the previous run.
        let (index, deck_label) = match (&self.deck, &self.persisted) {
            (None, Some(previous)) => (previous.index, previous.deck_label.clone()),
            _ => (self.state.index, self.deck_label.clone()),
        };
        let snapshot = SessionSnapshot {
            config: self.config.clone(),
            index,
            deck_label,
        };
        self.persisted = Some(snapshot.clone());
        snapshot
    }

    fn save(&mut self) -> PlayerEffect {
        PlayerEffect::SaveSession(self.snapshot())
    }

    fn study_options(&self) -> Vec<String> {
        self.deck
            .as_ref()
            .map(|deck| ordered_options(&deck.language_keys(), &self.languages))
            .unwrap_or_default()
    }

    fn translation_options(&self) -> Vec<String> {
        translation_options(&self.study_options(), self.config.study_language.as_deref())
    }

    fn study_tag(&self) -> Option<String> {
        self.config
            .study_language
            .as_deref()
            .map(resolve_speech_lang)
    }

    fn translation_tag(&self) -> Option<String> {
        self.config
            .translation_language
            .as_deref()
            .map(resolve_speech_lang)
    }

    /// Settle study and translation languages against the loaded deck,
    /// keeping current selections that are still offered.
    fn reconcile_languages(&mut self) {
        let study = self.study_options();
        let keep_study = self
            .config
            .study_language
            .as_ref()
            .is_some_and(|lang| study.contains(lang));
        if !keep_study {
            self.config.study_language = default_study_language(&study, &self.languages);
        }

        let translation = self.translation_options();
        let keep_translation = self
            .config
            .translation_language
            .as_ref()
            .is_some_and(|lang| translation.contains(lang));
        if !keep_translation {
            self.config.translation_language =
                default_translation_language(&translation, &self.languages);
        }
    }

    /// Re-resolve voice selections. Returns whether anything changed. An
    /// empty catalog keeps whatever was selected.
    fn reconcile_voices(&mut self) -> bool {
        if self.catalog.is_empty() {
            return false;
        }
        let before = (
            self.config.study_voice.clone(),
            self.config.alternate_study_voice.clone(),
            self.config.translation_voice.clone(),
        );

        match self.study_tag() {
            Some(tag) => {
                self.config.study_voice = self.catalog.reconcile(
                    &tag,
                    VoiceRole::Study,
                    self.config.study_voice.as_deref(),
                );
                self.config.alternate_study_voice = self.alternate_for(&tag);
            }
            None => {
                self.config.alternate_study_voice = None;
            }
        }
        if let Some(tag) = self.translation_tag() {
            self.config.translation_voice = self.catalog.reconcile(
                &tag,
                VoiceRole::Translation,
                self.config.translation_voice.as_deref(),
            );
        }

        before
            != (
                self.config.study_voice.clone(),
                self.config.alternate_study_voice.clone(),
                self.config.translation_voice.clone(),
            )
    }

    fn alternate_for(&self, tag: &str) -> Option<String> {
        let primary = self.config.study_voice.as_deref()?;
        self.catalog
            .alternate_voice_for(tag, primary)
            .map(|voice| voice.id.clone())
    }

    fn language_options_command(&self) -> RenderCommand {
        RenderCommand::LanguageOptions {
            study: self.study_options(),
            study_selected: self.config.study_language.clone(),
            translation: self.translation_options(),
            translation_selected: self.config.translation_language.clone(),
        }
    }

    fn voice_options_command(&self, role: VoiceRole) -> RenderCommand {
        let (tag, selected) = match role {
            VoiceRole::Study => (self.study_tag(), self.config.study_voice.clone()),
            VoiceRole::Translation => {
                (self.translation_tag(), self.config.translation_voice.clone())
            }
        };
        let options = tag
            .map(|tag| {
                self.catalog
                    .voices_for_language(&tag)
                    .map(|voice| VoiceOption {
                        id: voice.id.clone(),
                        label: voice.label(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        RenderCommand::VoiceOptions {
            role,
            options,
            selected,
        }
    }

    fn selector_commands(&self) -> Vec<PlayerEffect> {
        vec![
            PlayerEffect::Render(self.language_options_command()),
            PlayerEffect::Render(self.voice_options_command(VoiceRole::Study)),
            PlayerEffect::Render(self.voice_options_command(VoiceRole::Translation)),
        ]
    }
}
