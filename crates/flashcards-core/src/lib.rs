//! Core of the flashcards player.
//!
//! The playback sequencer is a plain state machine: it consumes
//! [`PlayerEvent`]s and answers with [`PlayerEffect`]s. The [`runtime`] module
//! drives it on tokio, executing effects against the injected platform
//! services (speech engine, presenter, key-value store, wake lock).

pub mod cancellation;
pub mod config;
pub mod deck;
pub mod error;
pub mod languages;
pub mod playback;
pub mod player;
pub mod presenter;
pub mod runtime;
pub mod sequencer;
pub mod session;
pub mod voices;

pub use deck::{Card, Deck};
pub use error::{PlayerError, Result};
pub use playback::PlaybackConfig;
pub use player::{SpeechEngine, Utterance, UtterancePlayer, UtteranceRequest};
pub use presenter::{Presenter, RenderCommand, WakeLock};
pub use runtime::{PlayerHandle, PlayerRuntime};
pub use sequencer::{PlayToken, PlayerEffect, PlayerEvent, PlaybackPhase, Sequencer};
pub use session::{FileStore, KeyValueStore, MemoryStore, SessionSnapshot, SessionStore};
pub use voices::{VoiceCatalog, VoiceDescriptor, VoiceRole};
