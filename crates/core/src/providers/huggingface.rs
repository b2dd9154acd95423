//! Hugging Face Inference API integration (stateless variant).

use crate::ai_client::{AiBackend, AiError, AiRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stateless backend: each call sends only the current prompt to the
/// configured model endpoint; any history in the request is ignored.
pub struct HuggingFaceBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    model_url: Option<String>,
}

impl HuggingFaceBackend {
    pub fn new(api_key: Option<String>, model_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model_url,
        }
    }
}

#[async_trait]
impl AiBackend for HuggingFaceBackend {
    async fn generate(&self, request: &AiRequest) -> Result<String, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(AiError::MissingCredential)?;
        let model_url = self
            .model_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(AiError::MissingCredential)?;

        debug!(model_url, "Requesting Hugging Face inference.");
        let response = self
            .client
            .post(model_url)
            .bearer_auth(api_key)
            .json(&InferenceRequest {
                inputs: &request.prompt,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::RemoteService(format!("{status}: {text}")));
        }

        let payload: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|_| AiError::MalformedResponse)?;
        extract_text(payload)
    }
}

fn extract_text(payload: Vec<GeneratedText>) -> Result<String, AiError> {
    payload
        .into_iter()
        .next()
        .and_then(|generation| generation.generated_text)
        .filter(|text| !text.is_empty())
        .ok_or(AiError::MalformedResponse)
}

// --- Wire types (fixed by the Inference API) ---

#[derive(Serialize, Debug)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize, Debug)]
struct GeneratedText {
    generated_text: Option<String>,
}
