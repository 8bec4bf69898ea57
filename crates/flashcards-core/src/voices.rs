//! Voice catalog: the engine's voices plus the default-selection policy.
//!
//! The catalog starts empty on platforms that publish their voices late.
//! [`VoiceCatalog::replace`] reports whether anything changed so the sequencer
//! can re-resolve its selections without touching in-flight playback.

use crate::languages::{same_primary_language, same_tag};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

static MALE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bmale\b").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoiceDescriptor {
    pub id: String,
    pub name: String,
    pub lang: String,
}

impl VoiceDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lang: lang.into(),
        }
    }

    /// Label shown in voice selectors.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.lang)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum VoiceRole {
    Study,
    Translation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePreferences {
    /// Name prefix marking the vendor's voices (e.g. `Google`).
    pub vendor: String,
    /// Full name of the voice preferred for the study role.
    pub preferred_male: String,
}

#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    voices: Vec<VoiceDescriptor>,
    prefs: VoicePreferences,
}

impl VoiceCatalog {
    pub fn new(prefs: VoicePreferences) -> Self {
        Self {
            voices: Vec::new(),
            prefs,
        }
    }

    /// Swap in a fresh voice list. Returns `true` when the list changed.
    pub fn replace(&mut self, voices: Vec<VoiceDescriptor>) -> bool {
        if voices == self.voices {
            return false;
        }
        self.voices = voices;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn list_voices(&self) -> &[VoiceDescriptor] {
        &self.voices
    }

    pub fn find(&self, id: &str) -> Option<&VoiceDescriptor> {
        self.voices.iter().find(|voice| voice.id == id)
    }

    /// Voices sharing the tag's primary subtag: `en-GB` also matches `en-US`.
    pub fn voices_for_language<'a>(
        &'a self,
        tag: &str,
    ) -> impl Iterator<Item = &'a VoiceDescriptor> {
        self.voices
            .iter()
            .filter(move |voice| same_primary_language(&voice.lang, tag))
    }

    pub fn default_voice_for(&self, tag: &str, role: VoiceRole) -> Option<&VoiceDescriptor> {
        match role {
            VoiceRole::Study => self
                .voices_for_language(tag)
                .find(|voice| voice.name == self.prefs.preferred_male)
                .or_else(|| {
                    self.voices_for_language(tag)
                        .find(|voice| self.is_vendor(voice) && MALE_MARKER.is_match(&voice.name))
                })
                .or_else(|| self.voices_for_language(tag).find(|voice| self.is_vendor(voice)))
                .or_else(|| self.voices_for_language(tag).next()),
            VoiceRole::Translation => self
                .voices_for_language(tag)
                .find(|voice| self.is_vendor(voice) && same_tag(&voice.lang, tag)),
        }
    }

    pub fn alternate_voice_for(&self, tag: &str, excluding_id: &str) -> Option<&VoiceDescriptor> {
        self.voices_for_language(tag)
            .find(|voice| voice.id != excluding_id)
    }

    /// Keep `current` when it still belongs to the language, otherwise pick
    /// the role default.
    pub fn reconcile(&self, tag: &str, role: VoiceRole, current: Option<&str>) -> Option<String> {
        if let Some(id) = current {
            if self.voices_for_language(tag).any(|voice| voice.id == id) {
                return Some(id.to_string());
            }
        }
        self.default_voice_for(tag, role)
            .map(|voice| voice.id.clone())
    }

    fn is_vendor(&self, voice: &VoiceDescriptor) -> bool {
        !self.prefs.vendor.is_empty() && voice.name.starts_with(&self.prefs.vendor)
    }
}
