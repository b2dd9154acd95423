//! WebSocket-backed implementations of the core capability traits.
//!
//! The browser owns the actual speech synthesizer and the 3D avatar; these
//! types translate the orchestrator's capability calls into protocol
//! messages, and turn the browser's speech lifecycle reports back into the
//! result of a `speak` call.

use super::protocol::ServerMessage;
use async_trait::async_trait;
use studymate_core::{AvatarHandle, Frontend, SpeechError, SpeechPlayback};
use tokio::sync::{Mutex, mpsc};

/// Sender for everything that goes down to the browser.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Lifecycle reports from the browser about the utterance it is playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Ended { error: Option<String> },
}

/// Sends mouth-animation cues to the browser's avatar.
pub struct WsAvatar {
    outbound: OutboundSender,
}

impl WsAvatar {
    pub fn new(outbound: OutboundSender) -> Self {
        Self { outbound }
    }
}

impl AvatarHandle for WsAvatar {
    // A closed channel means the session is shutting down; the cues are
    // fire-and-forget either way.
    fn start_talking(&self) {
        let _ = self.outbound.send(ServerMessage::TalkingStart);
    }

    fn stop_talking(&self) {
        let _ = self.outbound.send(ServerMessage::TalkingEnd);
    }
}

/// Drives the browser's status line and input affordances.
pub struct WsFrontend {
    outbound: OutboundSender,
}

impl WsFrontend {
    pub fn new(outbound: OutboundSender) -> Self {
        Self { outbound }
    }
}

impl Frontend for WsFrontend {
    fn set_busy(&self, busy: bool) {
        let _ = self.outbound.send(ServerMessage::Busy { busy });
    }

    fn show_status(&self, message: &str, is_error: bool) {
        let _ = self.outbound.send(ServerMessage::Status {
            message: message.to_string(),
            is_error,
        });
    }

    fn clear_status(&self) {
        let _ = self.outbound.send(ServerMessage::StatusClear);
    }
}

/// Speaks by handing the utterance to the browser and waiting for its
/// lifecycle reports.
pub struct WsSpeech {
    outbound: OutboundSender,
    events: Mutex<mpsc::Receiver<SpeechEvent>>,
}

impl WsSpeech {
    pub fn new(outbound: OutboundSender, events: mpsc::Receiver<SpeechEvent>) -> Self {
        Self {
            outbound,
            events: Mutex::new(events),
        }
    }
}

#[async_trait]
impl SpeechPlayback for WsSpeech {
    async fn speak(&self, text: &str, avatar: &dyn AvatarHandle) -> Result<(), SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let mut events = self.events.lock().await;
        // Reports left over from a preempted utterance belong to a dead
        // playback; the browser cancels it when the new `speak` arrives.
        while events.try_recv().is_ok() {}

        self.outbound
            .send(ServerMessage::Speak {
                text: text.to_string(),
            })
            .map_err(|_| SpeechError::Disconnected)?;

        loop {
            match events.recv().await {
                Some(SpeechEvent::Started) => avatar.start_talking(),
                Some(SpeechEvent::Ended { error }) => {
                    // The mouth closes whether playback succeeded or not.
                    avatar.stop_talking();
                    return match error {
                        None => Ok(()),
                        Some(message) => Err(SpeechError::Synthesis(message)),
                    };
                }
                None => {
                    avatar.stop_talking();
                    return Err(SpeechError::Disconnected);
                }
            }
        }
    }
}
