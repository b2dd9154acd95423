//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the configured AI
//! backend and the loaded configuration. The backend variant is chosen here,
//! once, at startup.

use crate::config::{AiService, Config};
use std::sync::Arc;
use studymate_core::providers::{GeminiBackend, HuggingFaceBackend};
use studymate_core::{AiBackend, prompts};
use tracing::info;

/// The shared application state, created once at startup and passed to all
/// connection handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn AiBackend>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let backend = build_backend(&config);
        Self {
            backend,
            config: Arc::new(config),
        }
    }
}

/// Selects the AI backend variant from explicit configuration.
pub fn build_backend(config: &Config) -> Arc<dyn AiBackend> {
    match config.ai_service {
        AiService::Gemini => {
            info!(model = %config.gemini_model, "Using Gemini backend.");
            Arc::new(GeminiBackend::new(
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
                prompts::PERSONA,
            ))
        }
        AiService::HuggingFace => {
            info!("Using Hugging Face backend.");
            Arc::new(HuggingFaceBackend::new(
                config.hf_api_key.clone(),
                config.hf_model_url.clone(),
            ))
        }
    }
}
