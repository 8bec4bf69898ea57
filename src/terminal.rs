use flashcards_core::presenter::{Presenter, RenderCommand, VoiceOption};
use flashcards_core::voices::VoiceRole;

/// Prints render commands to stdout; logs stay on stderr.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    last_counter: Option<(usize, usize)>,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::FadeOut => {}
            RenderCommand::Counter { position, total } => {
                self.last_counter = Some((position, total));
                println!();
                println!("[{position} / {total}]");
            }
            RenderCommand::Translation { text } => {
                if !text.is_empty() {
                    println!("  ({text})");
                }
            }
            RenderCommand::Phrase { text } => println!("  {text}"),
            RenderCommand::DeckLabel { label } => println!("Deck: {label}"),
            RenderCommand::Error { message } => {
                if let Some(message) = message {
                    println!("! {message}");
                }
            }
            RenderCommand::LanguageOptions {
                study,
                study_selected,
                translation,
                translation_selected,
            } => {
                println!(
                    "Study languages: {}",
                    mark_selected(&study, study_selected.as_deref())
                );
                println!(
                    "Translation languages: {}",
                    mark_selected(&translation, translation_selected.as_deref())
                );
            }
            RenderCommand::VoiceOptions {
                role,
                options,
                selected,
            } => {
                if options.is_empty() {
                    return;
                }
                let heading = match role {
                    VoiceRole::Study => "Study voices",
                    VoiceRole::Translation => "Translation voices",
                };
                println!("{heading}:");
                for VoiceOption { id, label } in options {
                    let marker = if selected.as_deref() == Some(id.as_str()) {
                        '*'
                    } else {
                        ' '
                    };
                    println!("  {marker} {id:<24} {label}");
                }
            }
            RenderCommand::PlaybackStatus { paused } => {
                let position = self
                    .last_counter
                    .map(|(position, total)| format!(" at {position} / {total}"))
                    .unwrap_or_default();
                if paused {
                    println!("-- paused{position} --");
                } else {
                    println!("-- playing --");
                }
            }
            RenderCommand::WakeLock { enabled } => {
                println!("Wake lock: {}", if enabled { "on" } else { "off" });
            }
        }
    }
}

fn mark_selected(options: &[String], selected: Option<&str>) -> String {
    options
        .iter()
        .map(|option| {
            if Some(option.as_str()) == selected {
                format!("[{option}]")
            } else {
                option.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_option_is_bracketed() {
        let options = vec!["en".to_string(), "es".to_string()];
        assert_eq!(mark_selected(&options, Some("es")), "en, [es]");
        assert_eq!(mark_selected(&options, None), "en, es");
    }
}
