use thiserror::Error;

/// Failures the player can observe. None of them are fatal: callers log and
/// continue without the affected feature.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("invalid deck: {0}")]
    DeckFormat(String),
    #[error("speech failed: {0}")]
    Speech(String),
    #[error("voice `{0}` is not available")]
    VoiceUnavailable(String),
    #[error("persisted session is invalid: {0}")]
    PersistedStateInvalid(String),
    #[error("wake lock unavailable: {0}")]
    WakeLockUnavailable(String),
    #[error("failed to encode session store: {0}")]
    StoreEncoding(#[from] toml::ser::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = PlayerError> = std::result::Result<T, E>;
