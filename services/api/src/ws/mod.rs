//! WebSocket Session Management
//!
//! This module contains the real-time plumbing between the browser front-end
//! and the core orchestrator. It is structured into submodules for clarity:
//!
//! - `protocol`: Defines the JSON-based message format for client-server communication.
//! - `bridge`: WebSocket-backed implementations of the core capability traits.
//! - `session`: Manages the WebSocket connection lifecycle, from upgrade to termination.

mod bridge;
pub mod protocol;
pub mod session;

pub use session::ws_handler;
