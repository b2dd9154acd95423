//! Manages the WebSocket connection lifecycle for a companion session.
//!
//! Each connection gets its own orchestrator, study session, and history. A
//! reader task splits inbound traffic so speech lifecycle reports can reach
//! an exchange already in flight, while commands queue up and are handled
//! one at a time by the main loop. That loop is what serializes exchanges;
//! the busy toggle shown to the user is advisory on top of it.

use super::{
    bridge::{OutboundSender, SpeechEvent, WsAvatar, WsFrontend, WsSpeech},
    protocol::{ClientMessage, ServerMessage},
};
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::{sync::Arc, time::Duration};
use studymate_core::{InterventionRequest, SessionOrchestrator, StudySession};
use tokio::sync::mpsc;
use tracing::{Instrument, info, warn};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Entry point for a new connection: sets up the session span and runs the
/// session loop until the client goes away.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    let span = tracing::info_span!("companion_session", %session_id);
    async move {
        info!("New WebSocket connection.");
        run_session(socket, state).await;
        info!("Session finished.");
    }
    .instrument(span)
    .await
}

/// The main event loop for an active companion session.
async fn run_session(socket: WebSocket, state: Arc<AppState>) {
    let (mut socket_tx, mut socket_rx) = socket.split();

    // Everything the capabilities emit funnels through one writer task.
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let Ok(serialized) = serde_json::to_string(&msg) else {
                continue;
            };
            if socket_tx.send(Message::Text(serialized.into())).await.is_err() {
                break;
            }
        }
    });

    // Speech lifecycle reports must reach an exchange that is already
    // waiting on them, so the reader routes those onto their own channel
    // instead of the command queue.
    let (command_tx, mut command_rx) = mpsc::channel::<ClientMessage>(32);
    let (speech_event_tx, speech_event_rx) = mpsc::channel::<SpeechEvent>(8);
    let reader = tokio::spawn(async move {
        while let Some(Ok(ws_msg)) = socket_rx.next().await {
            match ws_msg {
                Message::Text(text) => {
                    let msg = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(msg) => msg,
                        Err(e) => {
                            warn!(error = %e, "Ignoring malformed client message.");
                            continue;
                        }
                    };
                    match msg {
                        ClientMessage::SpeechStarted => {
                            let _ = speech_event_tx.send(SpeechEvent::Started).await;
                        }
                        ClientMessage::SpeechEnded { error } => {
                            let _ = speech_event_tx.send(SpeechEvent::Ended { error }).await;
                        }
                        command => {
                            if command_tx.send(command).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                Message::Close(_) => {
                    info!("Client sent close frame.");
                    break;
                }
                _ => {}
            }
        }
    });

    let (intervention_tx, mut intervention_rx) = mpsc::channel::<InterventionRequest>(8);
    let mut orchestrator = SessionOrchestrator::new(
        StudySession::new(intervention_tx),
        state.backend.clone(),
        Arc::new(WsSpeech::new(outbound_tx.clone(), speech_event_rx)),
        Arc::new(WsAvatar::new(outbound_tx.clone())),
        Arc::new(WsFrontend::new(outbound_tx.clone())),
    );

    push_session_state(&outbound_tx, &orchestrator).await;

    loop {
        tokio::select! {
            command = command_rx.recv() => {
                let Some(command) = command else { break };
                match command {
                    ClientMessage::UserMessage { text } => {
                        orchestrator.handle_user_message(&text).await;
                    }
                    ClientMessage::StartSession { duration_secs, problem_text } => {
                        orchestrator
                            .handle_session_start(Duration::from_secs(duration_secs), &problem_text)
                            .await;
                        push_session_state(&outbound_tx, &orchestrator).await;
                    }
                    ClientMessage::CompleteSession => {
                        orchestrator.handle_session_complete().await;
                        push_session_state(&outbound_tx, &orchestrator).await;
                    }
                    ClientMessage::ResetSession => {
                        orchestrator.handle_session_reset().await;
                        push_session_state(&outbound_tx, &orchestrator).await;
                    }
                    // Lifecycle reports are routed by the reader task.
                    ClientMessage::SpeechStarted | ClientMessage::SpeechEnded { .. } => {}
                }
            }
            request = intervention_rx.recv() => {
                let Some(request) = request else { break };
                orchestrator.handle_timer_intervention(request).await;
                push_session_state(&outbound_tx, &orchestrator).await;
            }
        }
    }

    reader.abort();
    writer.abort();
    info!("WebSocket connection closed and companion session terminated.");
}

async fn push_session_state(outbound: &OutboundSender, orchestrator: &SessionOrchestrator) {
    let state = orchestrator.session_state().await;
    let _ = outbound.send(ServerMessage::SessionState { state });
}
