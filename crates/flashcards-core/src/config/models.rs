use crate::languages::LanguagePreferences;
use crate::sequencer::Timings;
use crate::voices::VoicePreferences;
use serde::Deserialize;
use std::time::Duration;

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_speed")]
    pub default_speed: f32,
    #[serde(default = "crate::config::defaults::default_pause_secs")]
    pub default_pause_secs: f32,
    #[serde(default = "crate::config::defaults::default_repeat_count")]
    pub default_repeat_count: u32,
    #[serde(default = "crate::config::defaults::default_show_translation")]
    pub default_show_translation: bool,
    #[serde(default = "crate::config::defaults::default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_inter_repeat_delay_ms")]
    pub inter_repeat_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_wake_lock_on_load")]
    pub wake_lock_on_load: bool,
    #[serde(default = "crate::config::defaults::default_voice_vendor")]
    pub voice_vendor: String,
    #[serde(default = "crate::config::defaults::default_preferred_male_voice")]
    pub preferred_male_voice: String,
    #[serde(default = "crate::config::defaults::default_preferred_languages")]
    pub preferred_languages: Vec<String>,
    #[serde(default = "crate::config::defaults::default_preferred_study_language")]
    pub preferred_study_language: String,
    #[serde(default = "crate::config::defaults::default_preferred_translation_languages")]
    pub preferred_translation_languages: Vec<String>,
    #[serde(default = "crate::config::defaults::default_speech_backend")]
    pub speech_backend: SpeechBackend,
    #[serde(default = "crate::config::defaults::default_espeak_path")]
    pub espeak_path: String,
    #[serde(default = "crate::config::defaults::default_session_path")]
    pub session_path: String,
    #[serde(default = "crate::config::defaults::default_session_key_prefix")]
    pub session_key_prefix: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_key_toggle_pause")]
    pub key_toggle_pause: String,
    #[serde(default = "crate::config::defaults::default_key_next")]
    pub key_next: String,
    #[serde(default = "crate::config::defaults::default_key_restart")]
    pub key_restart: String,
    #[serde(default = "crate::config::defaults::default_key_toggle_wake_lock")]
    pub key_toggle_wake_lock: String,
    #[serde(default = "crate::config::defaults::default_key_quit")]
    pub key_quit: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_speed: crate::config::defaults::default_speed(),
            default_pause_secs: crate::config::defaults::default_pause_secs(),
            default_repeat_count: crate::config::defaults::default_repeat_count(),
            default_show_translation: crate::config::defaults::default_show_translation(),
            settle_delay_ms: crate::config::defaults::default_settle_delay_ms(),
            inter_repeat_delay_ms: crate::config::defaults::default_inter_repeat_delay_ms(),
            wake_lock_on_load: crate::config::defaults::default_wake_lock_on_load(),
            voice_vendor: crate::config::defaults::default_voice_vendor(),
            preferred_male_voice: crate::config::defaults::default_preferred_male_voice(),
            preferred_languages: crate::config::defaults::default_preferred_languages(),
            preferred_study_language: crate::config::defaults::default_preferred_study_language(),
            preferred_translation_languages:
                crate::config::defaults::default_preferred_translation_languages(),
            speech_backend: crate::config::defaults::default_speech_backend(),
            espeak_path: crate::config::defaults::default_espeak_path(),
            session_path: crate::config::defaults::default_session_path(),
            session_key_prefix: crate::config::defaults::default_session_key_prefix(),
            log_level: crate::config::defaults::default_log_level(),
            key_toggle_pause: crate::config::defaults::default_key_toggle_pause(),
            key_next: crate::config::defaults::default_key_next(),
            key_restart: crate::config::defaults::default_key_restart(),
            key_toggle_wake_lock: crate::config::defaults::default_key_toggle_wake_lock(),
            key_quit: crate::config::defaults::default_key_quit(),
        }
    }
}

impl AppConfig {
    pub fn timings(&self) -> Timings {
        Timings {
            settle: Duration::from_millis(self.settle_delay_ms),
            inter_repeat: Duration::from_millis(self.inter_repeat_delay_ms),
        }
    }

    pub fn voice_preferences(&self) -> VoicePreferences {
        VoicePreferences {
            vendor: self.voice_vendor.clone(),
            preferred_male: self.preferred_male_voice.clone(),
        }
    }

    pub fn language_preferences(&self) -> LanguagePreferences {
        LanguagePreferences {
            order: self.preferred_languages.clone(),
            study: self.preferred_study_language.clone(),
            translation: self.preferred_translation_languages.clone(),
        }
    }
}

/// Which speech backend the binary should drive.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechBackend {
    #[default]
    Espeak,
    Silent,
}

impl std::fmt::Display for SpeechBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SpeechBackend::Espeak => "espeak",
            SpeechBackend::Silent => "silent",
        };
        write!(f, "{}", label)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
