use super::defaults;
use super::models::{AppConfig, LogLevel, SpeechBackend};
use serde::Deserialize;

pub(super) const TABLE_NAMES: [&str; 5] = ["playback", "voices", "session", "logging", "controls"];

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    playback: PlaybackTable,
    #[serde(default)]
    voices: VoicesTable,
    #[serde(default)]
    session: SessionTable,
    #[serde(default)]
    logging: LoggingTable,
    #[serde(default)]
    controls: ControlsTable,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            default_speed: tables.playback.speed,
            default_pause_secs: tables.playback.pause_secs,
            default_repeat_count: tables.playback.repeat_count,
            default_show_translation: tables.playback.show_translation,
            settle_delay_ms: tables.playback.settle_delay_ms,
            inter_repeat_delay_ms: tables.playback.inter_repeat_delay_ms,
            wake_lock_on_load: tables.playback.wake_lock_on_load,
            voice_vendor: tables.voices.vendor,
            preferred_male_voice: tables.voices.preferred_male_voice,
            preferred_languages: tables.voices.preferred_languages,
            preferred_study_language: tables.voices.preferred_study_language,
            preferred_translation_languages: tables.voices.preferred_translation_languages,
            speech_backend: tables.voices.backend,
            espeak_path: tables.voices.espeak_path,
            session_path: tables.session.path,
            session_key_prefix: tables.session.key_prefix,
            log_level: tables.logging.log_level,
            key_toggle_pause: tables.controls.toggle_pause,
            key_next: tables.controls.next,
            key_restart: tables.controls.restart,
            key_toggle_wake_lock: tables.controls.toggle_wake_lock,
            key_quit: tables.controls.quit,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            playback: PlaybackTable {
                speed: config.default_speed,
                pause_secs: config.default_pause_secs,
                repeat_count: config.default_repeat_count,
                show_translation: config.default_show_translation,
                settle_delay_ms: config.settle_delay_ms,
                inter_repeat_delay_ms: config.inter_repeat_delay_ms,
                wake_lock_on_load: config.wake_lock_on_load,
            },
            voices: VoicesTable {
                vendor: config.voice_vendor.clone(),
                preferred_male_voice: config.preferred_male_voice.clone(),
                preferred_languages: config.preferred_languages.clone(),
                preferred_study_language: config.preferred_study_language.clone(),
                preferred_translation_languages: config.preferred_translation_languages.clone(),
                backend: config.speech_backend,
                espeak_path: config.espeak_path.clone(),
            },
            session: SessionTable {
                path: config.session_path.clone(),
                key_prefix: config.session_key_prefix.clone(),
            },
            logging: LoggingTable {
                log_level: config.log_level,
            },
            controls: ControlsTable {
                toggle_pause: config.key_toggle_pause.clone(),
                next: config.key_next.clone(),
                restart: config.key_restart.clone(),
                toggle_wake_lock: config.key_toggle_wake_lock.clone(),
                quit: config.key_quit.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct PlaybackTable {
    #[serde(default = "defaults::default_speed")]
    speed: f32,
    #[serde(default = "defaults::default_pause_secs")]
    pause_secs: f32,
    #[serde(default = "defaults::default_repeat_count")]
    repeat_count: u32,
    #[serde(default = "defaults::default_show_translation")]
    show_translation: bool,
    #[serde(default = "defaults::default_settle_delay_ms")]
    settle_delay_ms: u64,
    #[serde(default = "defaults::default_inter_repeat_delay_ms")]
    inter_repeat_delay_ms: u64,
    #[serde(default = "defaults::default_wake_lock_on_load")]
    wake_lock_on_load: bool,
}

impl Default for PlaybackTable {
    fn default() -> Self {
        Self {
            speed: defaults::default_speed(),
            pause_secs: defaults::default_pause_secs(),
            repeat_count: defaults::default_repeat_count(),
            show_translation: defaults::default_show_translation(),
            settle_delay_ms: defaults::default_settle_delay_ms(),
            inter_repeat_delay_ms: defaults::default_inter_repeat_delay_ms(),
            wake_lock_on_load: defaults::default_wake_lock_on_load(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct VoicesTable {
    #[serde(default = "defaults::default_voice_vendor")]
    vendor: String,
    #[serde(default = "defaults::default_preferred_male_voice")]
    preferred_male_voice: String,
    #[serde(default = "defaults::default_preferred_languages")]
    preferred_languages: Vec<String>,
    #[serde(default = "defaults::default_preferred_study_language")]
    preferred_study_language: String,
    #[serde(default = "defaults::default_preferred_translation_languages")]
    preferred_translation_languages: Vec<String>,
    #[serde(default = "defaults::default_speech_backend")]
    backend: SpeechBackend,
    #[serde(default = "defaults::default_espeak_path")]
    espeak_path: String,
}

impl Default for VoicesTable {
    fn default() -> Self {
        Self {
            vendor: defaults::default_voice_vendor(),
            preferred_male_voice: defaults::default_preferred_male_voice(),
            preferred_languages: defaults::default_preferred_languages(),
            preferred_study_language: defaults::default_preferred_study_language(),
            preferred_translation_languages: defaults::default_preferred_translation_languages(),
            backend: defaults::default_speech_backend(),
            espeak_path: defaults::default_espeak_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SessionTable {
    #[serde(default = "defaults::default_session_path")]
    path: String,
    #[serde(default = "defaults::default_session_key_prefix")]
    key_prefix: String,
}

impl Default for SessionTable {
    fn default() -> Self {
        Self {
            path: defaults::default_session_path(),
            key_prefix: defaults::default_session_key_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingTable {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingTable {
    fn default() -> Self {
        Self {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ControlsTable {
    #[serde(default = "defaults::default_key_toggle_pause")]
    toggle_pause: String,
    #[serde(default = "defaults::default_key_next")]
    next: String,
    #[serde(default = "defaults::default_key_restart")]
    restart: String,
    #[serde(default = "defaults::default_key_toggle_wake_lock")]
    toggle_wake_lock: String,
    #[serde(default = "defaults::default_key_quit")]
    quit: String,
}

impl Default for ControlsTable {
    fn default() -> Self {
        Self {
            toggle_pause: defaults::default_key_toggle_pause(),
            next: defaults::default_key_next(),
            restart: defaults::default_key_restart(),
            toggle_wake_lock: defaults::default_key_toggle_wake_lock(),
            quit: defaults::default_key_quit(),
        }
    }
}
