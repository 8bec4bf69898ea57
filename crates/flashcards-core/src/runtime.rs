//! Tokio driver for the sequencer.
//!
//! Events arrive on an unbounded channel (from the front end through a
//! [`PlayerHandle`], and from the speech and timer tasks spawned here). Each
//! event runs through [`Sequencer::handle`] and the returned effects are
//! executed in order. One [`CancellationToken`] per cycle lets `BeginCycle`
//! and `Halt` stop every task the previous cycle spawned.

use crate::cancellation::CancellationToken;
use crate::config::AppConfig;
use crate::playback::PlaybackConfig;
use crate::player::{SpeechEngine, SpeechOutcome, UtterancePlayer, UtteranceRequest, resolve_voice};
use crate::presenter::{Presenter, WakeLock};
use crate::sequencer::{PlayToken, PlayerEffect, PlayerEvent, Sequencer, TimerKind};
use crate::session::{KeyValueStore, SessionSnapshot, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Cloneable sender for front-end events.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    tx: UnboundedSender<PlayerEvent>,
}

impl PlayerHandle {
    /// Queue an event. Returns `false` once the runtime has stopped.
    pub fn send(&self, event: PlayerEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

pub struct PlayerRuntime<S> {
    sequencer: Sequencer,
    player: UtterancePlayer,
    presenter: Box<dyn Presenter>,
    session: SessionStore<S>,
    wake_lock: Box<dyn WakeLock>,
    wake_lock_warned: bool,
    cycle: CancellationToken,
    tx: UnboundedSender<PlayerEvent>,
    rx: UnboundedReceiver<PlayerEvent>,
}

impl<S: KeyValueStore> PlayerRuntime<S> {
    /// Build the runtime and restore the saved session from `store`.
    pub fn new(
        config: &AppConfig,
        engine: Arc<dyn SpeechEngine>,
        presenter: Box<dyn Presenter>,
        store: S,
        wake_lock: Box<dyn WakeLock>,
    ) -> Self {
        let session = SessionStore::new(store, config.session_key_prefix.clone());
        let restored = session.load(&PlaybackConfig::from_app_config(config));
        let (tx, rx) = unbounded_channel();
        Self {
            sequencer: Sequencer::new(config, restored),
            player: UtterancePlayer::new(engine),
            presenter,
            session,
            wake_lock,
            wake_lock_warned: false,
            cycle: CancellationToken::new(),
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> PlayerHandle {
        PlayerHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// Process events until `Unload` has been handled.
    pub async fn run(&mut self) {
        let forwarder = self.forward_voice_updates();
        let initial = self.player.engine().voices();
        self.dispatch(PlayerEvent::VoicesChanged(initial));

        while let Some(event) = self.rx.recv().await {
            let unload = matches!(event, PlayerEvent::Unload);
            self.dispatch(event);
            if unload {
                break;
            }
        }

        forwarder.abort();
        info!("Player runtime stopped");
    }

    pub fn dispatch(&mut self, event: PlayerEvent) {
        for effect in self.sequencer.handle(event) {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: PlayerEffect) {
        match effect {
            PlayerEffect::BeginCycle { token } => {
                debug!(token = token.0, "Superseding previous cycle");
                self.reset_cycle();
            }
            PlayerEffect::Halt => self.reset_cycle(),
            PlayerEffect::Render(command) => self.presenter.render(command),
            PlayerEffect::Speak(request) => self.spawn_speech(request),
            PlayerEffect::StartTimer {
                token,
                timer,
                after,
            } => self.spawn_timer(token, timer, after),
            PlayerEffect::SaveSession(snapshot) => self.save(&snapshot),
            PlayerEffect::AcquireWakeLock => match self.wake_lock.acquire() {
                Ok(()) => debug!("Wake lock acquired"),
                Err(err) => {
                    if !self.wake_lock_warned {
                        warn!("{err}");
                        self.wake_lock_warned = true;
                    }
                }
            },
            PlayerEffect::ReleaseWakeLock => self.wake_lock.release(),
        }
    }

    fn reset_cycle(&mut self) {
        self.cycle.cancel();
        self.cycle = CancellationToken::new();
        self.player.cancel();
    }

    fn spawn_speech(&self, request: UtteranceRequest) {
        let voice = resolve_voice(
            self.sequencer.catalog(),
            request.voice_id.as_deref(),
            &request.lang,
        );
        let player = self.player.clone();
        let cancel = self.cycle.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let token = request.token;
            let outcome = player.speak(request, voice, cancel).await;
            if outcome != SpeechOutcome::Superseded {
                let _ = tx.send(PlayerEvent::SpeechFinished { token });
            }
        });
    }

    fn spawn_timer(&self, token: PlayToken, timer: TimerKind, after: Duration) {
        let cancel = self.cycle.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(after) => {
                    let _ = tx.send(PlayerEvent::TimerElapsed { token, timer });
                }
                _ = cancel.cancelled() => {}
            }
        });
    }

    fn save(&mut self, snapshot: &SessionSnapshot) {
        if let Err(err) = self.session.save(snapshot) {
            warn!("Failed to save session: {err}");
        }
    }

    fn forward_voice_updates(&self) -> JoinHandle<()> {
        let mut updates = self.player.engine().voice_updates();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let voices = updates.borrow_and_update().clone();
                if tx.send(PlayerEvent::VoicesChanged(voices)).is_err() {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Deck;
    use crate::error::Result;
    use crate::player::Utterance;
    use crate::presenter::RenderCommand;
    use crate::session::MemoryStore;
    use crate::voices::VoiceDescriptor;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::watch;

    struct FakeEngine {
        spoken: Mutex<Vec<Utterance>>,
        updates: watch::Sender<Vec<VoiceDescriptor>>,
    }

    impl FakeEngine {
        fn new(voices: Vec<VoiceDescriptor>) -> Arc<Self> {
            let (updates, _) = watch::channel(voices);
            Arc::new(Self {
                spoken: Mutex::new(Vec::new()),
                updates,
            })
        }

        fn spoken(&self) -> Vec<(String, String, Option<String>)> {
            self.spoken
                .lock()
                .expect("spoken lock")
                .iter()
                .map(|utterance| {
                    (
                        utterance.text.clone(),
                        utterance.lang.clone(),
                        utterance.voice.as_ref().map(|voice| voice.id.clone()),
                    )
                })
                .collect()
        }
    }

    #[async_trait]
    impl SpeechEngine for FakeEngine {
        fn voices(&self) -> Vec<VoiceDescriptor> {
            self.updates.borrow().clone()
        }

        fn voice_updates(&self) -> watch::Receiver<Vec<VoiceDescriptor>> {
            self.updates.subscribe()
        }

        async fn speak(&self, utterance: Utterance) -> Result<()> {
            self.spoken.lock().expect("spoken lock").push(utterance);
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        }

        fn cancel(&self) {}
    }

    #[derive(Clone, Default)]
    struct RecordingPresenter {
        commands: Arc<Mutex<Vec<RenderCommand>>>,
    }

    impl Presenter for RecordingPresenter {
        fn render(&mut self, command: RenderCommand) {
            self.commands.lock().expect("commands lock").push(command);
        }
    }

    #[derive(Clone, Default)]
    struct CountingWakeLock {
        acquired: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    impl WakeLock for CountingWakeLock {
        fn acquire(&mut self) -> Result<()> {
            self.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn release(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn voices() -> Vec<VoiceDescriptor> {
        vec![
            VoiceDescriptor::new("g-uk-male", "Google UK English Male", "en-GB"),
            VoiceDescriptor::new("g-us", "Google US English", "en-US"),
            VoiceDescriptor::new("samantha", "Samantha", "en-US"),
            VoiceDescriptor::new("g-es", "Google español", "es-ES"),
        ]
    }

    fn deck() -> Deck {
        Deck::from_json(r#"[{"en":"Hello","es":"Hola"},{"en":"Bye","es":"Adiós"}]"#)
            .expect("deck")
    }

    fn runtime(
        engine: Arc<FakeEngine>,
        presenter: RecordingPresenter,
        wake_lock: CountingWakeLock,
    ) -> PlayerRuntime<MemoryStore> {
        PlayerRuntime::new(
            &AppConfig::default(),
            engine,
            Box::new(presenter),
            MemoryStore::new(),
            Box::new(wake_lock),
        )
    }

    fn send_at(handle: &PlayerHandle, millis: u64, event: PlayerEvent) {
        let handle = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            handle.send(event);
        });
    }

    fn owned(text: &str, lang: &str, voice: &str) -> (String, String, Option<String>) {
        (text.to_string(), lang.to_string(), Some(voice.to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn plays_translation_then_alternating_study_voices() {
        let engine = FakeEngine::new(voices());
        let presenter = RecordingPresenter::default();
        let lock = CountingWakeLock::default();
        let mut runtime = runtime(engine.clone(), presenter.clone(), lock.clone());
        let handle = runtime.handle();
        handle.send(PlayerEvent::DeckLoaded {
            label: "greetings.json".to_string(),
            deck: deck(),
        });
        // The second card's cycle starts at 7.75s and settles at 8.0s.
        send_at(&handle, 7_900, PlayerEvent::Unload);
        runtime.run().await;

        assert_eq!(
            engine.spoken(),
            vec![
                owned("Hola", "es-ES", "g-es"),
                owned("Hello", "en-US", "g-uk-male"),
                owned("Hello", "en-US", "g-us"),
            ]
        );
        assert_eq!(runtime.sequencer().state().index, 1);
        let commands = presenter.commands.lock().expect("commands lock");
        assert!(commands.contains(&RenderCommand::Counter {
            position: 1,
            total: 2
        }));
        assert!(commands.contains(&RenderCommand::Translation {
            text: "Hola".to_string()
        }));
        assert_eq!(lock.acquired.load(Ordering::SeqCst), 2);
        assert_eq!(
            runtime.session().inner().get("flashcards.index").as_deref(),
            Some("1")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pause_cuts_speech_and_stops_advancing() {
        let engine = FakeEngine::new(voices());
        let lock = CountingWakeLock::default();
        let mut runtime = runtime(engine.clone(), RecordingPresenter::default(), lock.clone());
        let handle = runtime.handle();
        handle.send(PlayerEvent::DeckLoaded {
            label: "greetings.json".to_string(),
            deck: deck(),
        });
        // Mid-way through the first study repeat.
        send_at(&handle, 3_500, PlayerEvent::TogglePause);
        send_at(&handle, 20_000, PlayerEvent::Unload);
        runtime.run().await;

        assert_eq!(
            engine.spoken(),
            vec![
                owned("Hola", "es-ES", "g-es"),
                owned("Hello", "en-US", "g-uk-male"),
            ]
        );
        assert_eq!(runtime.sequencer().state().index, 0);
        assert!(runtime.sequencer().state().paused);
        assert!(lock.released.load(Ordering::SeqCst) >= 1);
        assert_eq!(
            runtime.session().inner().get("flashcards.deck_label").as_deref(),
            Some("greetings.json")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resumes_saved_card_after_initial_voice_sync() {
        let mut store = MemoryStore::new();
        store.set("flashcards.index", "1".to_string());
        store.set("flashcards.deck_label", "greetings.json".to_string());
        store.set("flashcards.study_lang", "en".to_string());
        let engine = FakeEngine::new(voices());
        let mut runtime = PlayerRuntime::new(
            &AppConfig::default(),
            engine.clone(),
            Box::new(RecordingPresenter::default()),
            store,
            Box::new(CountingWakeLock::default()),
        );
        let handle = runtime.handle();
        handle.send(PlayerEvent::DeckLoaded {
            label: "greetings.json".to_string(),
            deck: deck(),
        });
        send_at(&handle, 500, PlayerEvent::Unload);
        runtime.run().await;

        assert_eq!(runtime.sequencer().state().index, 1);
        assert_eq!(engine.spoken(), vec![owned("Adiós", "es-ES", "g-es")]);
        assert_eq!(
            runtime.session().inner().get("flashcards.index").as_deref(),
            Some("1")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn late_voices_are_picked_up_before_speaking() {
        let engine = FakeEngine::new(Vec::new());
        let mut runtime = runtime(
            engine.clone(),
            RecordingPresenter::default(),
            CountingWakeLock::default(),
        );
        let handle = runtime.handle();
        handle.send(PlayerEvent::DeckLoaded {
            label: "greetings.json".to_string(),
            deck: deck(),
        });
        let publisher = engine.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            publisher.updates.send_replace(voices());
        });
        send_at(&handle, 1_000, PlayerEvent::Unload);
        runtime.run().await;

        assert_eq!(engine.spoken(), vec![owned("Hola", "es-ES", "g-es")]);
        assert_eq!(
            runtime.sequencer().config().study_voice.as_deref(),
            Some("g-uk-male")
        );
    }
}
