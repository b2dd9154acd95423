//! Defines the WebSocket message protocol between the browser client and the
//! session server. The browser owns the 3D avatar and the speech synthesizer;
//! the server owns the study session, the history, and the AI exchanges.

use serde::{Deserialize, Serialize};
use studymate_core::StudyState;

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A direct chat message from the user.
    UserMessage { text: String },
    /// Starts a study session with a timer and the problem being worked on.
    StartSession {
        duration_secs: u64,
        problem_text: String,
    },
    /// The user pressed the complete button.
    CompleteSession,
    /// Returns the session to idle without a celebration exchange.
    ResetSession,
    /// The synthesizer began audible playback of the current utterance.
    SpeechStarted,
    /// Playback finished, or failed with the given error.
    SpeechEnded {
        #[serde(default)]
        error: Option<String>,
    },
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The client should synthesize and play this text, cancelling any
    /// utterance still in progress.
    Speak { text: String },
    /// The avatar should start its mouth animation.
    TalkingStart,
    /// The avatar should stop its mouth animation.
    TalkingEnd,
    /// Disables or re-enables the input affordances while an exchange is in
    /// flight.
    Busy { busy: bool },
    /// A transient status line ("Thinking...", error text).
    Status { message: String, is_error: bool },
    /// Clears the status line.
    StatusClear,
    /// The current study-session state, pushed after every session command.
    SessionState { state: StudyState },
    /// Reports a fatal error to the client.
    Error { message: String },
}
