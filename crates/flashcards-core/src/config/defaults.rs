pub(crate) fn default_speed() -> f32 {
    1.0
}

pub(crate) fn default_pause_secs() -> f32 {
    2.0
}

pub(crate) fn default_repeat_count() -> u32 {
    2
}

pub(crate) fn default_show_translation() -> bool {
    true
}

pub(crate) fn default_settle_delay_ms() -> u64 {
    250
}

pub(crate) fn default_inter_repeat_delay_ms() -> u64 {
    500
}

pub(crate) fn default_wake_lock_on_load() -> bool {
    true
}

pub(crate) fn default_voice_vendor() -> String {
    "Google".to_string()
}

pub(crate) fn default_preferred_male_voice() -> String {
    "Google UK English Male".to_string()
}

pub(crate) fn default_preferred_languages() -> Vec<String> {
    vec!["en-GB".to_string(), "fr-FR".to_string(), "es-ES".to_string()]
}

pub(crate) fn default_preferred_study_language() -> String {
    "en-GB".to_string()
}

pub(crate) fn default_preferred_translation_languages() -> Vec<String> {
    vec!["es-ES".to_string(), "fr-FR".to_string()]
}

pub(crate) fn default_speech_backend() -> crate::config::SpeechBackend {
    crate::config::SpeechBackend::Espeak
}

pub(crate) fn default_espeak_path() -> String {
    "espeak-ng".to_string()
}

pub(crate) fn default_session_path() -> String {
    ".cache/session.toml".to_string()
}

pub(crate) fn default_session_key_prefix() -> String {
    "flashcards.".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}

pub(crate) fn default_key_toggle_pause() -> String {
    "p".to_string()
}

pub(crate) fn default_key_next() -> String {
    "n".to_string()
}

pub(crate) fn default_key_restart() -> String {
    "r".to_string()
}

pub(crate) fn default_key_toggle_wake_lock() -> String {
    "w".to_string()
}

pub(crate) fn default_key_quit() -> String {
    "q".to_string()
}
