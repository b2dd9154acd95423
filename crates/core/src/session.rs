//! Study Session State Machine
//!
//! Tracks whether the user is idle, actively studying, or being intervened
//! upon, and owns the single pending intervention timer. Timer expiry is
//! reported over a channel so the session's owner can drive the resulting
//! AI exchange from its own event loop.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The three states a study session can be in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StudyState {
    Idle,
    Studying,
    Intervening,
}

/// Emitted when the study timer elapses without the user completing the
/// problem. Carries the session-start parameters for prompt construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterventionRequest {
    pub problem_text: String,
    pub duration: Duration,
}

struct Inner {
    state: StudyState,
    timer: Option<JoinHandle<()>>,
}

/// The study-session state machine.
///
/// At most one timer task is pending at any time; starting a session replaces
/// any previous handle, and `complete`/`reset` abort it. A timer that fires
/// for a session that is no longer `Studying` is a no-op.
pub struct StudySession {
    inner: Arc<Mutex<Inner>>,
    intervention_tx: mpsc::Sender<InterventionRequest>,
}

impl StudySession {
    /// Creates an idle session that reports timer expiry on `intervention_tx`.
    pub fn new(intervention_tx: mpsc::Sender<InterventionRequest>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: StudyState::Idle,
                timer: None,
            })),
            intervention_tx,
        }
    }

    /// Starts a study session and schedules the intervention timer.
    ///
    /// Rejected with a warning if a session is already active; state and the
    /// pending timer are left untouched in that case.
    pub async fn start(&self, duration: Duration, problem_text: &str) {
        let mut inner = self.inner.lock().await;
        if inner.state != StudyState::Idle {
            warn!(state = ?inner.state, "Cannot start a new study session while one is active.");
            return;
        }

        info!(duration_secs = duration.as_secs(), "Starting study session.");
        inner.state = StudyState::Studying;
        if let Some(handle) = inner.timer.take() {
            handle.abort();
        }

        let shared = Arc::clone(&self.inner);
        let tx = self.intervention_tx.clone();
        let problem_text = problem_text.to_string();
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            let mut inner = shared.lock().await;
            if inner.state != StudyState::Studying {
                debug!("Timer fired for a session that is no longer studying. Ignoring.");
                return;
            }
            info!("Study timer elapsed. Requesting intervention.");
            inner.state = StudyState::Intervening;
            inner.timer = None;
            // Release the lock before sending so a busy receiver cannot
            // block other session operations.
            drop(inner);

            if tx
                .send(InterventionRequest {
                    problem_text,
                    duration,
                })
                .await
                .is_err()
            {
                warn!("Intervention receiver dropped before the timer fired.");
            }
        }));
    }

    /// Ends the current session, cancelling any pending timer.
    pub async fn complete(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == StudyState::Idle {
            return;
        }

        info!("Study session completed by user.");
        if let Some(handle) = inner.timer.take() {
            handle.abort();
        }
        inner.state = StudyState::Idle;
    }

    /// Returns to idle from any state, cancelling any pending timer.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(handle) = inner.timer.take() {
            handle.abort();
        }
        inner.state = StudyState::Idle;
        debug!("Session state reset to idle.");
    }

    /// Aborts and clears the pending timer without changing state.
    pub async fn clear_pending_timer(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(handle) = inner.timer.take() {
            handle.abort();
        }
    }

    pub async fn state(&self) -> StudyState {
        self.inner.lock().await.state
    }

    /// Whether a timer task is currently pending.
    pub async fn has_pending_timer(&self) -> bool {
        self.inner.lock().await.timer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    fn session() -> (StudySession, mpsc::Receiver<InterventionRequest>) {
        let (tx, rx) = mpsc::channel(8);
        (StudySession::new(tx), rx)
    }

    #[tokio::test]
    async fn test_start_transitions_to_studying() {
        let (session, _rx) = session();
        assert_eq!(session.state().await, StudyState::Idle);

        session.start(Duration::from_secs(60), "solve x+2=5").await;
        assert_eq!(session.state().await, StudyState::Studying);
        assert!(session.has_pending_timer().await);
    }

    #[tokio::test]
    async fn test_start_while_active_is_rejected() {
        let (session, mut rx) = session();
        session.start(Duration::from_millis(50), "first problem").await;
        // The second start must not replace the timer or the session.
        session.start(Duration::from_millis(1), "second problem").await;

        assert_eq!(session.state().await, StudyState::Studying);
        let request = timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timer should fire")
            .expect("channel open");
        assert_eq!(request.problem_text, "first problem");
        assert_eq!(request.duration, Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_timer_fires_with_session_parameters() {
        let (session, mut rx) = session();
        session.start(Duration::from_millis(10), "solve x+2=5").await;

        let request = timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timer should fire")
            .expect("channel open");
        assert_eq!(request.problem_text, "solve x+2=5");
        assert_eq!(request.duration, Duration::from_millis(10));
        assert_eq!(session.state().await, StudyState::Intervening);
        assert!(!session.has_pending_timer().await);
    }

    #[tokio::test]
    async fn test_timer_fires_exactly_once() {
        let (session, mut rx) = session();
        session.start(Duration::from_millis(10), "problem").await;

        timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timer should fire")
            .expect("channel open");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_complete_cancels_pending_timer() {
        let (session, mut rx) = session();
        session.start(Duration::from_millis(100), "problem").await;
        session.complete().await;

        assert_eq!(session.state().await, StudyState::Idle);
        assert!(!session.has_pending_timer().await);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_complete_from_intervening_returns_to_idle() {
        let (session, mut rx) = session();
        session.start(Duration::from_millis(10), "problem").await;
        timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timer should fire")
            .expect("channel open");

        assert_eq!(session.state().await, StudyState::Intervening);
        session.complete().await;
        assert_eq!(session.state().await, StudyState::Idle);
    }

    #[tokio::test]
    async fn test_complete_while_idle_is_a_noop() {
        let (session, _rx) = session();
        session.complete().await;
        assert_eq!(session.state().await, StudyState::Idle);
    }

    #[tokio::test]
    async fn test_reset_cancels_timer_and_returns_to_idle() {
        let (session, mut rx) = session();
        session.start(Duration::from_millis(100), "problem").await;
        session.reset().await;

        assert_eq!(session.state().await, StudyState::Idle);
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_clear_pending_timer_keeps_state() {
        let (session, mut rx) = session();
        session.start(Duration::from_millis(100), "problem").await;
        session.clear_pending_timer().await;

        assert_eq!(session.state().await, StudyState::Studying);
        assert!(!session.has_pending_timer().await);
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_session_can_restart_after_complete() {
        let (session, mut rx) = session();
        session.start(Duration::from_millis(10), "first").await;
        session.complete().await;
        session.start(Duration::from_millis(10), "second").await;

        let request = timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timer should fire")
            .expect("channel open");
        assert_eq!(request.problem_text, "second");
    }
}
