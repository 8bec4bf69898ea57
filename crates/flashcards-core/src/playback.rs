//! User-selected playback configuration.

use crate::config::AppConfig;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const MIN_SPEED: f32 = 0.1;
pub const MAX_SPEED: f32 = 10.0;
pub const MAX_PAUSE_SECS: f32 = 60.0;
pub const MIN_REPEAT_COUNT: u32 = 1;
pub const MAX_REPEAT_COUNT: u32 = 20;

/// Selections driving the per-card cycle. Language fields hold deck keys, not
/// speech tags; voice fields hold catalog ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlaybackConfig {
    pub study_language: Option<String>,
    pub translation_language: Option<String>,
    pub study_voice: Option<String>,
    /// Derived from the study language and voice; never chosen directly.
    pub alternate_study_voice: Option<String>,
    pub translation_voice: Option<String>,
    pub speed: f32,
    pub pause_secs: f32,
    pub repeat_count: u32,
    pub show_translation: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl PlaybackConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            study_language: None,
            translation_language: None,
            study_voice: None,
            alternate_study_voice: None,
            translation_voice: None,
            speed: clamp_speed(config.default_speed),
            pause_secs: clamp_pause_secs(config.default_pause_secs),
            repeat_count: clamp_repeat_count(config.default_repeat_count),
            show_translation: config.default_show_translation,
        }
    }

    /// Clamp numeric fields into their supported ranges.
    pub fn normalized(mut self) -> Self {
        self.speed = clamp_speed(self.speed);
        self.pause_secs = clamp_pause_secs(self.pause_secs);
        self.repeat_count = clamp_repeat_count(self.repeat_count);
        self
    }
}

pub fn clamp_speed(speed: f32) -> f32 {
    if speed.is_finite() {
        speed.clamp(MIN_SPEED, MAX_SPEED)
    } else {
        1.0
    }
}

pub fn clamp_pause_secs(secs: f32) -> f32 {
    if secs.is_finite() {
        secs.clamp(0.0, MAX_PAUSE_SECS)
    } else {
        0.0
    }
}

pub fn clamp_repeat_count(count: u32) -> u32 {
    count.clamp(MIN_REPEAT_COUNT, MAX_REPEAT_COUNT)
}
