//! Concrete [`AiBackend`](crate::ai_client::AiBackend) integrations.
//!
//! - `gemini`: conversational, sends the pruned history plus a fixed persona
//!   on every call.
//! - `huggingface`: stateless single-shot inference, no memory between calls.
//!
//! The wire shapes mirror the third-party APIs and are not negotiable here.

pub mod gemini;
pub mod huggingface;

pub use gemini::GeminiBackend;
pub use huggingface::HuggingFaceBackend;
