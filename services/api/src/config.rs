use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported AI text-generation services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AiService {
    Gemini,
    HuggingFace,
}

/// Holds all configuration loaded from the environment at startup.
///
/// The core never reads the environment itself; this struct is passed into
/// the backend and orchestrator constructors explicitly.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub ai_service: AiService,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub hf_api_key: Option<String>,
    pub hf_model_url: Option<String>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let service_str = std::env::var("AI_SERVICE").unwrap_or_else(|_| "gemini".to_string());
        let ai_service = match service_str.to_lowercase().as_str() {
            "huggingface" => AiService::HuggingFace,
            _ => AiService::Gemini,
        };

        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let hf_api_key = std::env::var("HF_API_KEY").ok();
        let hf_model_url = std::env::var("HF_MODEL_URL").ok();

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        match ai_service {
            AiService::Gemini => {
                if gemini_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "GEMINI_API_KEY must be set for the 'gemini' service".to_string(),
                    ));
                }
            }
            AiService::HuggingFace => {
                if hf_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "HF_API_KEY must be set for the 'huggingface' service".to_string(),
                    ));
                }
                if hf_model_url.is_none() {
                    return Err(ConfigError::MissingVar(
                        "HF_MODEL_URL must be set for the 'huggingface' service".to_string(),
                    ));
                }
            }
        }

        Ok(Self {
            bind_address,
            ai_service,
            gemini_api_key,
            gemini_model,
            hf_api_key,
            hf_model_url,
            log_level,
        })
    }
}
