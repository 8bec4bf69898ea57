//! Terminal input: one command per stdin line.
//!
//! Single-key commands come from the `[controls]` bindings; commands that
//! take a value (`speed 1.5`, `study es`, ...) are fixed words.

use flashcards_core::PlayerEvent;
use flashcards_core::config::AppConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Event(PlayerEvent),
    Quit,
    Help,
}

pub const HELP: &str = "\
commands:
  <toggle-pause key>   play / pause
  <next key>           next card
  <restart key>        restart from the first card
  <wake-lock key>      toggle the wake lock
  <quit key>           save and quit
  speed <0.1-10>       speech rate
  pause <secs>         pause between phases
  repeat <1-20>        study repeats per card
  show on|off          translation phase
  study <lang>         study language key
  translation <lang>   translation language key
  voice <id>           study voice
  tvoice <id>          translation voice
  help                 this text";

pub fn parse_line(line: &str, config: &AppConfig) -> Option<Input> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let pressed = normalize_key(word, "enter");

    if rest.is_empty() {
        if key_matches(&config.key_toggle_pause, "p", &pressed) {
            return Some(Input::Event(PlayerEvent::TogglePause));
        } else if key_matches(&config.key_next, "n", &pressed) {
            return Some(Input::Event(PlayerEvent::Next));
        } else if key_matches(&config.key_restart, "r", &pressed) {
            return Some(Input::Event(PlayerEvent::Restart));
        } else if key_matches(&config.key_toggle_wake_lock, "w", &pressed) {
            return Some(Input::Event(PlayerEvent::ToggleWakeLock));
        } else if key_matches(&config.key_quit, "q", &pressed) {
            return Some(Input::Quit);
        }
    }

    let event = match (pressed.as_str(), rest) {
        ("help" | "?", _) => return Some(Input::Help),
        ("quit" | "exit", _) => return Some(Input::Quit),
        ("speed", value) => PlayerEvent::SetSpeed(value.parse().ok()?),
        ("pause", value) if !value.is_empty() => PlayerEvent::SetPauseSecs(value.parse().ok()?),
        ("repeat", value) => PlayerEvent::SetRepeatCount(value.parse().ok()?),
        ("show", "on" | "yes" | "true") => PlayerEvent::SetShowTranslation(true),
        ("show", "off" | "no" | "false") => PlayerEvent::SetShowTranslation(false),
        ("study", lang) if !lang.is_empty() => PlayerEvent::SelectStudyLanguage(lang.to_string()),
        ("translation", lang) if !lang.is_empty() => {
            PlayerEvent::SelectTranslationLanguage(lang.to_string())
        }
        ("voice", id) if !id.is_empty() => PlayerEvent::SelectStudyVoice(id.to_string()),
        ("tvoice", id) if !id.is_empty() => PlayerEvent::SelectTranslationVoice(id.to_string()),
        _ => return None,
    };
    Some(Input::Event(event))
}

fn key_matches(raw: &str, fallback: &str, pressed: &str) -> bool {
    normalize_key(raw, fallback) == pressed
}

fn normalize_key(raw: &str, fallback: &str) -> String {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        fallback.to_string()
    } else {
        normalized.replace("return", "enter")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_map_to_controls() {
        let config = AppConfig::default();
        assert_eq!(
            parse_line("p", &config),
            Some(Input::Event(PlayerEvent::TogglePause))
        );
        assert_eq!(
            parse_line(" N ", &config),
            Some(Input::Event(PlayerEvent::Next))
        );
        assert_eq!(parse_line("q", &config), Some(Input::Quit));
    }

    #[test]
    fn custom_binding_for_enter() {
        let config = AppConfig {
            key_next: "Return".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            parse_line("", &config),
            Some(Input::Event(PlayerEvent::Next))
        );
    }

    #[test]
    fn valued_commands_parse() {
        let config = AppConfig::default();
        assert_eq!(
            parse_line("speed 1.5", &config),
            Some(Input::Event(PlayerEvent::SetSpeed(1.5)))
        );
        assert_eq!(
            parse_line("study es-ES", &config),
            Some(Input::Event(PlayerEvent::SelectStudyLanguage(
                "es-ES".to_string()
            )))
        );
        assert_eq!(
            parse_line("show off", &config),
            Some(Input::Event(PlayerEvent::SetShowTranslation(false)))
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        let config = AppConfig::default();
        assert_eq!(parse_line("repeat lots", &config), None);
        assert_eq!(parse_line("voice", &config), None);
        assert_eq!(parse_line("dance", &config), None);
    }
}
