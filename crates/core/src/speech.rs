//! Capability contracts for the excluded subsystems the orchestrator talks
//! to: speech playback, the avatar's talking cues, and the user-facing
//! status/affordance surface. Concrete implementations live with whatever
//! front-end transport the service uses.

use async_trait::async_trait;
use thiserror::Error;

/// Failures of a speech playback attempt.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("cannot speak empty text")]
    EmptyText,

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// The playback channel closed before the utterance finished.
    #[error("speech playback is disconnected")]
    Disconnected,
}

/// Mouth-animation cues for the avatar. Fire-and-forget.
pub trait AvatarHandle: Send + Sync {
    fn start_talking(&self);
    fn stop_talking(&self);
}

/// Renders text to audible speech.
#[async_trait]
pub trait SpeechPlayback: Send + Sync {
    /// Speaks `text`, resolving when playback finishes.
    ///
    /// Implementations must reject empty text, call `avatar.start_talking()`
    /// when audible output begins and `avatar.stop_talking()` when it ends
    /// or errors (the mouth must close either way), and preempt any
    /// utterance still playing when a new one starts.
    async fn speak(&self, text: &str, avatar: &dyn AvatarHandle) -> Result<(), SpeechError>;
}

/// The user-facing surface: transient status text and the solicited-input
/// affordance that is disabled while an exchange is in flight.
pub trait Frontend: Send + Sync {
    fn set_busy(&self, busy: bool);
    fn show_status(&self, message: &str, is_error: bool);
    fn clear_status(&self);
}
