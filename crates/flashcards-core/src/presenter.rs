//! Contracts for the presentation layer and the screen wake lock.
//!
//! Render commands are plain data so a web adapter can consume them as JSON;
//! the TypeScript bindings are exported from the derive.

use crate::error::Result;
use crate::voices::VoiceRole;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct VoiceOption {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum RenderCommand {
    /// Fade the phrase and translation regions out before the next card.
    FadeOut,
    Counter {
        position: usize,
        total: usize,
    },
    Translation {
        text: String,
    },
    Phrase {
        text: String,
    },
    DeckLabel {
        label: String,
    },
    /// `None` clears the error region.
    Error {
        message: Option<String>,
    },
    LanguageOptions {
        study: Vec<String>,
        study_selected: Option<String>,
        translation: Vec<String>,
        translation_selected: Option<String>,
    },
    /// An empty option list hides the selector.
    VoiceOptions {
        role: VoiceRole,
        options: Vec<VoiceOption>,
        selected: Option<String>,
    },
    PlaybackStatus {
        paused: bool,
    },
    WakeLock {
        enabled: bool,
    },
}

pub trait Presenter: Send {
    fn render(&mut self, command: RenderCommand);
}

/// Keeps the screen awake while cards play.
pub trait WakeLock: Send {
    fn acquire(&mut self) -> Result<()>;
    fn release(&mut self);
}

/// For platforms without a wake lock.
#[derive(Debug, Default)]
pub struct UnsupportedWakeLock;

impl WakeLock for UnsupportedWakeLock {
    fn acquire(&mut self) -> Result<()> {
        Err(crate::error::PlayerError::WakeLockUnavailable(
            "not supported on this platform".to_string(),
        ))
    }

    fn release(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_commands_serialize_with_kind_tag() {
        let json = serde_json::to_value(RenderCommand::Counter {
            position: 1,
            total: 2,
        })
        .expect("serialize counter");
        assert_eq!(
            json,
            serde_json::json!({ "kind": "counter", "position": 1, "total": 2 })
        );

        let json = serde_json::to_value(RenderCommand::VoiceOptions {
            role: VoiceRole::Translation,
            options: vec![VoiceOption {
                id: "g-es".to_string(),
                label: "Google español (es-ES)".to_string(),
            }],
            selected: Some("g-es".to_string()),
        })
        .expect("serialize voice options");
        assert_eq!(json["kind"], "voice_options");
        assert_eq!(json["role"], "translation");
    }

    #[test]
    fn unsupported_wake_lock_reports_unavailable() {
        let mut lock = UnsupportedWakeLock;
        assert!(lock.acquire().is_err());
        lock.release();
    }
}
