use std::time::Duration;

/// Generation counter for playback cycles. Every continuation carries the
/// token it was issued under and is dropped once a newer one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlayToken(pub u64);

impl PlayToken {
    pub fn next(self) -> Self {
        PlayToken(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// No deck loaded yet.
    #[default]
    Idle,
    /// Faded out, waiting for the settle delay before the counter.
    Showing,
    SpeakingTranslation,
    AwaitingPostTranslationPause,
    SpeakingStudy {
        repeat: u32,
    },
    /// Short gap before the given repeat is spoken.
    AwaitingNextRepeat {
        repeat: u32,
    },
    AwaitingInterCardPause,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Settle,
    PostTranslation,
    NextRepeat { repeat: u32 },
    InterCard,
}

/// Fixed delays of the card cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub settle: Duration,
    pub inter_repeat: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(250),
            inter_repeat: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequencerState {
    pub index: usize,
    pub paused: bool,
    pub token: PlayToken,
    pub phase: PlaybackPhase,
}
