//! Studymate API Library Crate
//!
//! This library contains the service-side logic for the studymate companion:
//! configuration, application state, the WebSocket session endpoint, and
//! routing. The `main.rs` binary is a thin wrapper around this library.

pub mod config;
pub mod router;
pub mod state;
pub mod ws;
