use super::{PlayToken, PlaybackPhase, PlayerEffect, PlayerEvent, Sequencer, TimerKind};
use crate::deck::Deck;
use crate::error::PlayerError;
use crate::languages::resolve_speech_lang;
use crate::playback::{clamp_pause_secs, clamp_repeat_count, clamp_speed};
use crate::player::UtteranceRequest;
use crate::presenter::RenderCommand;
use crate::voices::{VoiceDescriptor, VoiceRole};
use std::time::Duration;
use tracing::{debug, info, warn};

pub(super) fn transition(seq: &mut Sequencer, event: PlayerEvent) -> Vec<PlayerEffect> {
    match event {
        PlayerEvent::DeckLoaded { label, deck } => on_deck_loaded(seq, label, deck),
        PlayerEvent::DeckRejected { label, error } => on_deck_rejected(label, error),
        PlayerEvent::TogglePause => on_toggle_pause(seq),
        PlayerEvent::Restart => on_restart(seq),
        PlayerEvent::Next => on_next(seq),
        PlayerEvent::SelectStudyLanguage(lang) => on_study_language(seq, lang),
        PlayerEvent::SelectTranslationLanguage(lang) => on_translation_language(seq, lang),
        PlayerEvent::SelectStudyVoice(id) => on_study_voice(seq, id),
        PlayerEvent::SelectTranslationVoice(id) => on_translation_voice(seq, id),
        PlayerEvent::SetSpeed(speed) => {
            seq.config.speed = clamp_speed(speed);
            vec![seq.save()]
        }
        PlayerEvent::SetPauseSecs(secs) => {
            seq.config.pause_secs = clamp_pause_secs(secs);
            vec![seq.save()]
        }
        PlayerEvent::SetRepeatCount(count) => on_repeat_count(seq, count),
        PlayerEvent::SetShowTranslation(show) => {
            seq.config.show_translation = show;
            vec![seq.save()]
        }
        PlayerEvent::ToggleWakeLock => on_toggle_wake_lock(seq),
        PlayerEvent::VoicesChanged(voices) => on_voices_changed(seq, voices),
        PlayerEvent::VisibilityHidden => vec![seq.save()],
        PlayerEvent::Unload => {
            info!(index = seq.state.index, "Unloading; saving session");
            vec![PlayerEffect::Halt, PlayerEffect::ReleaseWakeLock, seq.save()]
        }
        PlayerEvent::SpeechFinished { token } => on_speech_finished(seq, token),
        PlayerEvent::TimerElapsed { token, timer } => on_timer(seq, token, timer),
    }
}

fn start_cycle(seq: &mut Sequencer) -> Vec<PlayerEffect> {
    if seq.deck.is_none() {
        return Vec::new();
    }
    seq.state.token = seq.state.token.next();
    seq.state.phase = PlaybackPhase::Showing;
    let token = seq.state.token;
    info!(index = seq.state.index, token = token.0, "Starting card cycle");

    let mut effects = vec![PlayerEffect::BeginCycle { token }];
    if seq.wake_lock_enabled {
        effects.push(PlayerEffect::AcquireWakeLock);
    }
    effects.push(PlayerEffect::Render(RenderCommand::FadeOut));
    effects.push(PlayerEffect::StartTimer {
        token,
        timer: TimerKind::Settle,
        after: seq.timings.settle,
    });
    effects
}

fn restart_if_playing(seq: &mut Sequencer, effects: &mut Vec<PlayerEffect>) {
    if seq.cycle_active() {
        effects.extend(start_cycle(seq));
    }
}

fn on_deck_loaded(seq: &mut Sequencer, label: String, deck: Deck) -> Vec<PlayerEffect> {
    let restored_index = seq
        .persisted
        .as_ref()
        .filter(|snapshot| snapshot.deck_label.as_deref() == Some(label.as_str()))
        .map(|snapshot| snapshot.index)
        .filter(|index| *index < deck.len());
    seq.state.index = restored_index.unwrap_or(0);
    info!(
        deck = %label,
        cards = deck.len(),
        index = seq.state.index,
        resumed = restored_index.is_some(),
        "Deck loaded"
    );

    seq.deck = Some(deck);
    seq.deck_label = Some(label.clone());
    seq.state.paused = false;
    seq.reconcile_languages();
    seq.reconcile_voices();
    seq.wake_lock_enabled = seq.wake_lock_on_load;

    let mut effects = vec![
        PlayerEffect::Render(RenderCommand::Error { message: None }),
        PlayerEffect::Render(RenderCommand::DeckLabel { label }),
    ];
    effects.extend(seq.selector_commands());
    effects.push(PlayerEffect::Render(RenderCommand::WakeLock {
        enabled: seq.wake_lock_enabled,
    }));
    effects.push(PlayerEffect::Render(RenderCommand::PlaybackStatus {
        paused: false,
    }));
    effects.push(seq.save());
    effects.extend(start_cycle(seq));
    effects
}

fn on_deck_rejected(label: String, error: String) -> Vec<PlayerEffect> {
    warn!(deck = %label, "Rejected deck: {error}");
    vec![PlayerEffect::Render(RenderCommand::Error {
        message: Some(format!("Error reading JSON: {error}")),
    })]
}

fn on_toggle_pause(seq: &mut Sequencer) -> Vec<PlayerEffect> {
    if seq.deck.is_none() {
        debug!("Pause ignored; no deck loaded");
        return Vec::new();
    }
    if seq.state.paused {
        seq.state.paused = false;
        info!(index = seq.state.index, "Resuming playback");
        let mut effects = vec![
            PlayerEffect::Render(RenderCommand::PlaybackStatus { paused: false }),
            seq.save(),
        ];
        effects.extend(start_cycle(seq));
        effects
    } else {
        seq.state.paused = true;
        seq.state.phase = PlaybackPhase::Paused;
        info!(index = seq.state.index, "Pausing playback");
        vec![
            PlayerEffect::Halt,
            PlayerEffect::ReleaseWakeLock,
            PlayerEffect::Render(RenderCommand::PlaybackStatus { paused: true }),
            seq.save(),
        ]
    }
}

fn on_restart(seq: &mut Sequencer) -> Vec<PlayerEffect> {
    let Some(deck) = seq.deck.as_ref() else {
        debug!("Restart ignored; no deck loaded");
        return Vec::new();
    };
    info!(cards = deck.len(), "Restarting from the first card");
    seq.state.index = 0;
    seq.state.paused = false;
    let mut effects = vec![
        PlayerEffect::Render(RenderCommand::PlaybackStatus { paused: false }),
        seq.save(),
    ];
    effects.extend(start_cycle(seq));
    effects
}

fn on_next(seq: &mut Sequencer) -> Vec<PlayerEffect> {
    if seq.state.paused {
        debug!("Next ignored while paused");
        return Vec::new();
    }
    let Some(len) = seq.deck.as_ref().map(Deck::len) else {
        return Vec::new();
    };
    seq.state.index = (seq.state.index + 1) % len;
    debug!(index = seq.state.index, "Skipping to next card");
    start_cycle(seq)
}

fn on_study_language(seq: &mut Sequencer, lang: String) -> Vec<PlayerEffect> {
    if seq.deck.is_some() && !seq.study_options().contains(&lang) {
        warn!(lang = %lang, "Ignoring unknown study language");
        return Vec::new();
    }
    if seq.config.study_language.as_deref() == Some(lang.as_str()) {
        return Vec::new();
    }
    info!(lang = %lang, "Study language changed");
    seq.config.study_language = Some(lang);
    if seq.deck.is_some() {
        seq.reconcile_languages();
    }
    seq.reconcile_voices();

    let mut effects = seq.selector_commands();
    effects.push(seq.save());
    restart_if_playing(seq, &mut effects);
    effects
}

fn on_translation_language(seq: &mut Sequencer, lang: String) -> Vec<PlayerEffect> {
    if seq.deck.is_some() && !seq.translation_options().contains(&lang) {
        warn!(lang = %lang, "Ignoring unknown translation language");
        return Vec::new();
    }
    info!(lang = %lang, "Translation language changed");
    seq.config.translation_language = Some(lang);
    seq.reconcile_voices();
    vec![
        PlayerEffect::Render(seq.voice_options_command(VoiceRole::Translation)),
        seq.save(),
    ]
}

fn on_study_voice(seq: &mut Sequencer, id: String) -> Vec<PlayerEffect> {
    if !seq.catalog.is_empty() && seq.catalog.find(&id).is_none() {
        warn!("{}", PlayerError::VoiceUnavailable(id));
        return Vec::new();
    }
    info!(voice = %id, "Study voice changed");
    seq.config.study_voice = Some(id);
    seq.config.alternate_study_voice = seq
        .study_tag()
        .and_then(|tag| seq.alternate_for(&tag));

    let mut effects = vec![
        PlayerEffect::Render(seq.voice_options_command(VoiceRole::Study)),
        seq.save(),
    ];
    restart_if_playing(seq, &mut effects);
    effects
}

fn on_translation_voice(seq: &mut Sequencer, id: String) -> Vec<PlayerEffect> {
    if !seq.catalog.is_empty() && seq.catalog.find(&id).is_none() {
        warn!("{}", PlayerError::VoiceUnavailable(id));
        return Vec::new();
    }
    info!(voice = %id, "Translation voice changed");
    seq.config.translation_voice = Some(id);
    vec![seq.save()]
}

fn on_repeat_count(seq: &mut Sequencer, count: u32) -> Vec<PlayerEffect> {
    let count = clamp_repeat_count(count);
    if count == seq.config.repeat_count {
        return Vec::new();
    }
    seq.config.repeat_count = count;
    let mut effects = vec![seq.save()];
    restart_if_playing(seq, &mut effects);
    effects
}

fn on_toggle_wake_lock(seq: &mut Sequencer) -> Vec<PlayerEffect> {
    seq.wake_lock_enabled = !seq.wake_lock_enabled;
    let enabled = seq.wake_lock_enabled;
    info!(enabled, "Wake lock toggled");
    let lock = if enabled && seq.cycle_active() {
        PlayerEffect::AcquireWakeLock
    } else {
        PlayerEffect::ReleaseWakeLock
    };
    vec![PlayerEffect::Render(RenderCommand::WakeLock { enabled }), lock]
}

fn on_voices_changed(seq: &mut Sequencer, voices: Vec<VoiceDescriptor>) -> Vec<PlayerEffect> {
    let count = voices.len();
    if !seq.catalog.replace(voices) {
        return Vec::new();
    }
    info!(voices = count, "Voice catalog changed");
    let changed = seq.reconcile_voices();
    let mut effects = vec![
        PlayerEffect::Render(seq.voice_options_command(VoiceRole::Study)),
        PlayerEffect::Render(seq.voice_options_command(VoiceRole::Translation)),
    ];
    if changed {
        effects.push(seq.save());
    }
    effects
}

fn on_timer(seq: &mut Sequencer, token: PlayToken, timer: TimerKind) -> Vec<PlayerEffect> {
    if !seq.is_live(token) {
        debug!(
            token = token.0,
            current = seq.state.token.0,
            ?timer,
            "Ignoring stale timer"
        );
        return Vec::new();
    }

    match (timer, seq.state.phase) {
        (TimerKind::Settle, PlaybackPhase::Showing) => on_settled(seq),
        (TimerKind::PostTranslation, PlaybackPhase::AwaitingPostTranslationPause) => {
            enter_study_phase(seq)
        }
        (TimerKind::NextRepeat { repeat }, PlaybackPhase::AwaitingNextRepeat { repeat: due })
            if repeat == due =>
        {
            vec![speak_study(seq, repeat)]
        }
        (TimerKind::InterCard, PlaybackPhase::AwaitingInterCardPause) => {
            let Some(len) = seq.deck.as_ref().map(Deck::len) else {
                return Vec::new();
            };
            seq.state.index = (seq.state.index + 1) % len;
            start_cycle(seq)
        }
        (timer, phase) => {
            debug!(?timer, ?phase, "Timer does not match current phase");
            Vec::new()
        }
    }
}

fn on_settled(seq: &mut Sequencer) -> Vec<PlayerEffect> {
    let total = seq.deck.as_ref().map(Deck::len).unwrap_or(0);
    let mut effects = vec![PlayerEffect::Render(RenderCommand::Counter {
        position: seq.state.index + 1,
        total,
    })];

    let translation = if seq.config.show_translation {
        seq.config
            .translation_language
            .as_deref()
            .map(|lang| card_text(seq, lang))
            .unwrap_or_default()
    } else {
        String::new()
    };

    if translation.trim().is_empty() {
        effects.push(PlayerEffect::Render(RenderCommand::Translation {
            text: String::new(),
        }));
        effects.extend(enter_study_phase(seq));
        return effects;
    }

    seq.state.phase = PlaybackPhase::SpeakingTranslation;
    let lang = seq
        .config
        .translation_language
        .as_deref()
        .map(resolve_speech_lang)
        .unwrap_or_default();
    effects.push(PlayerEffect::Render(RenderCommand::Translation {
        text: translation.clone(),
    }));
    effects.push(PlayerEffect::Speak(UtteranceRequest {
        text: translation,
        lang,
        voice_id: seq.config.translation_voice.clone(),
        rate: seq.config.speed,
        token: seq.state.token,
    }));
    effects
}

fn enter_study_phase(seq: &mut Sequencer) -> Vec<PlayerEffect> {
    let text = study_text(seq);
    vec![
        PlayerEffect::Render(RenderCommand::Phrase { text }),
        speak_study(seq, 0),
    ]
}

fn speak_study(seq: &mut Sequencer, repeat: u32) -> PlayerEffect {
    seq.state.phase = PlaybackPhase::SpeakingStudy { repeat };
    let voice_id = voice_for_repeat(seq, repeat);
    debug!(
        index = seq.state.index,
        repeat,
        voice = voice_id.as_deref(),
        "Speaking study phrase"
    );
    PlayerEffect::Speak(UtteranceRequest {
        text: study_text(seq),
        lang: seq
            .config
            .study_language
            .as_deref()
            .map(resolve_speech_lang)
            .unwrap_or_default(),
        voice_id,
        rate: seq.config.speed,
        token: seq.state.token,
    })
}

/// Even repeats use the primary voice, odd ones the alternate when there is
/// more than one repeat and an alternate exists.
fn voice_for_repeat(seq: &Sequencer, repeat: u32) -> Option<String> {
    let config = &seq.config;
    match config.alternate_study_voice.as_ref() {
        Some(alternate) if config.repeat_count > 1 && repeat % 2 == 1 => Some(alternate.clone()),
        _ => config.study_voice.clone(),
    }
}

fn on_speech_finished(seq: &mut Sequencer, token: PlayToken) -> Vec<PlayerEffect> {
    if !seq.is_live(token) {
        debug!(
            token = token.0,
            current = seq.state.token.0,
            "Ignoring stale speech completion"
        );
        return Vec::new();
    }

    let pause = Duration::from_secs_f32(seq.config.pause_secs);
    match seq.state.phase {
        PlaybackPhase::SpeakingTranslation => {
            seq.state.phase = PlaybackPhase::AwaitingPostTranslationPause;
            vec![PlayerEffect::StartTimer {
                token,
                timer: TimerKind::PostTranslation,
                after: pause,
            }]
        }
        PlaybackPhase::SpeakingStudy { repeat } if repeat + 1 < seq.config.repeat_count => {
            let next = repeat + 1;
            seq.state.phase = PlaybackPhase::AwaitingNextRepeat { repeat: next };
            vec![PlayerEffect::StartTimer {
                token,
                timer: TimerKind::NextRepeat { repeat: next },
                after: seq.timings.inter_repeat,
            }]
        }
        PlaybackPhase::SpeakingStudy { repeat } => {
            debug!(index = seq.state.index, repeat, "Card finished");
            seq.state.phase = PlaybackPhase::AwaitingInterCardPause;
            vec![PlayerEffect::StartTimer {
                token,
                timer: TimerKind::InterCard,
                after: pause,
            }]
        }
        phase => {
            debug!(?phase, "Speech completion outside a speaking phase");
            Vec::new()
        }
    }
}

fn card_text(seq: &Sequencer, lang: &str) -> String {
    seq.deck
        .as_ref()
        .and_then(|deck| deck.card(seq.state.index))
        .map(|card| card.text(lang).to_string())
        .unwrap_or_default()
}

fn study_text(seq: &Sequencer) -> String {
    seq.config
        .study_language
        .as_deref()
        .map(|lang| card_text(seq, lang))
        .unwrap_or_default()
}
