//! Session Orchestrator
//!
//! The top-level coordinator. Wires timer expiry and explicit user actions
//! into AI calls and speech playback. The owner is expected to drive it from
//! a single event loop, so every exchange runs to completion before the next
//! one starts; the busy toggle on the frontend is advisory gating on top of
//! that, not a lock.

use crate::{
    ai_client::{AiBackend, AiRequest},
    history::ConversationHistory,
    prompts,
    session::{InterventionRequest, StudySession, StudyState},
    speech::{AvatarHandle, Frontend, SpeechPlayback},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct SessionOrchestrator {
    history: ConversationHistory,
    session: StudySession,
    backend: Arc<dyn AiBackend>,
    speech: Arc<dyn SpeechPlayback>,
    avatar: Arc<dyn AvatarHandle>,
    frontend: Arc<dyn Frontend>,
}

impl SessionOrchestrator {
    pub fn new(
        session: StudySession,
        backend: Arc<dyn AiBackend>,
        speech: Arc<dyn SpeechPlayback>,
        avatar: Arc<dyn AvatarHandle>,
        frontend: Arc<dyn Frontend>,
    ) -> Self {
        Self {
            history: ConversationHistory::new(),
            session,
            backend,
            speech,
            avatar,
            frontend,
        }
    }

    /// A direct chat message from the user. Blank input is ignored.
    pub async fn handle_user_message(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.run_exchange(text.to_string()).await;
    }

    /// Starts the study timer. No AI exchange happens here.
    pub async fn handle_session_start(&self, duration: Duration, problem_text: &str) {
        self.session.start(duration, problem_text).await;
    }

    /// Ends the session and celebrates the completed problem.
    pub async fn handle_session_complete(&mut self) {
        self.session.complete().await;
        self.run_exchange(prompts::completion_prompt()).await;
    }

    /// Returns the session to idle without any AI exchange.
    pub async fn handle_session_reset(&self) {
        self.session.reset().await;
    }

    /// Delivers the spoken nudge after the study timer fired. The pending
    /// timer is cleared afterwards, but the session state is left alone;
    /// only an explicit complete returns it to idle.
    pub async fn handle_timer_intervention(&mut self, request: InterventionRequest) {
        info!(problem = %request.problem_text, "Delivering study intervention.");
        let prompt = prompts::intervention_prompt(&request.problem_text, request.duration);
        self.run_exchange(prompt).await;
        self.session.clear_pending_timer().await;
    }

    pub async fn session_state(&self) -> StudyState {
        self.session.state().await
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Runs one prompt → generation → speech exchange.
    ///
    /// Intervention and completion prompts go through here too, so they are
    /// appended into the same history the direct-chat path uses; the
    /// conversational backend's context stays consistent across all three
    /// exchange kinds, and the stateless backend simply ignores the history
    /// it is handed.
    async fn run_exchange(&mut self, prompt: String) {
        self.frontend.set_busy(true);
        self.frontend.show_status("Thinking...", false);

        let request = AiRequest::with_history(prompt.clone(), self.history.snapshot());
        // The user turn stays in the history even if generation fails.
        self.history.append_user(prompt);

        match self.backend.generate(&request).await {
            Ok(reply) => {
                self.frontend.clear_status();
                self.history.append_model(&reply);
                self.history.prune_if_over_limit();

                if let Err(error) = self.speech.speak(&reply, self.avatar.as_ref()).await {
                    warn!(%error, "Speech playback failed.");
                    self.frontend.show_status(&error.to_string(), true);
                }
            }
            Err(error) => {
                warn!(%error, "AI exchange failed.");
                self.frontend.show_status(&error.to_string(), true);
            }
        }

        // Re-enable input no matter how the exchange went.
        self.frontend.set_busy(false);
    }
}
