//! Google Gemini `generateContent` integration (conversational variant).

use crate::ai_client::{AiBackend, AiError, AiRequest};
use crate::history::{Role, Turn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const GENERATE_CONTENT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Conversational backend: every call carries the prior history and a fixed
/// persona as the system instruction.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    persona: String,
}

impl GeminiBackend {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            persona: persona.into(),
        }
    }

    fn build_body(&self, request: &AiRequest) -> GenerateContentRequest {
        let mut contents: Vec<Content> = request.history.iter().map(Content::from_turn).collect();
        contents.push(Content::user(&request.prompt));
        GenerateContentRequest {
            contents,
            system_instruction: Content::system(&self.persona),
        }
    }
}

#[async_trait]
impl AiBackend for GeminiBackend {
    async fn generate(&self, request: &AiRequest) -> Result<String, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(AiError::MissingCredential)?;

        let body = self.build_body(request);
        debug!(model = %self.model, turns = body.contents.len(), "Requesting Gemini generation.");

        let url = format!(
            "{GENERATE_CONTENT_BASE}/{}:generateContent?key={}",
            self.model, api_key
        );
        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(remote_error(status, &text));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|_| AiError::MalformedResponse)?;
        extract_text(payload)
    }
}

/// Converts a non-success response into a `RemoteService` error, passing the
/// upstream error message through when the payload carries one.
fn remote_error(status: reqwest::StatusCode, body: &str) -> AiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| format!("{status}: {body}"));
    AiError::RemoteService(message)
}

fn extract_text(payload: GenerateContentResponse) -> Result<String, AiError> {
    payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .filter(|text| !text.is_empty())
        .ok_or(AiError::MalformedResponse)
}

// --- Wire types (fixed by the Gemini REST API) ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

#[derive(Serialize, Deserialize, Debug)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Part {
    text: String,
}

impl Content {
    fn from_turn(turn: &Turn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Model => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: turn.text.clone(),
            }],
        }
    }

    fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    // The system instruction carries no role.
    fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GeminiBackend {
        GeminiBackend::new(
            Some("test-key".to_string()),
            "gemini-2.5-flash",
            "Be a helpful study partner.",
        )
    }

    #[test]
    fn test_request_body_wire_shape() {
        let request = AiRequest::with_history(
            "how do I start?",
            vec![
                Turn {
                    role: Role::User,
                    text: "hello".to_string(),
                },
                Turn {
                    role: Role::Model,
                    text: "hi!".to_string(),
                },
            ],
        );

        let body = serde_json::to_value(backend().build_body(&request)).unwrap();

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "hello");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "how do I start?");

        let instruction = &body["systemInstruction"];
        assert_eq!(instruction["parts"][0]["text"], "Be a helpful study partner.");
        assert!(instruction.get("role").is_none());
    }

    #[test]
    fn test_extract_text_from_success_payload() {
        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Keep going!"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(extract_text(payload).unwrap(), "Keep going!");
    }

    #[test]
    fn test_extract_text_without_candidates_is_malformed() {
        let payload: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(
            extract_text(payload),
            Err(AiError::MalformedResponse)
        ));
    }

    #[test]
    fn test_extract_text_without_parts_is_malformed() {
        let payload: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"role":"model","parts":[]}}]}"#)
                .unwrap();
        assert!(matches!(
            extract_text(payload),
            Err(AiError::MalformedResponse)
        ));
    }

    #[test]
    fn test_remote_error_extracts_upstream_message() {
        let error = remote_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#,
        );
        match error {
            AiError::RemoteService(message) => assert_eq!(message, "API key not valid"),
            other => panic!("expected RemoteService, got {other:?}"),
        }
    }

    #[test]
    fn test_remote_error_falls_back_to_status_and_body() {
        let error = remote_error(reqwest::StatusCode::BAD_GATEWAY, "upstream exploded");
        match error {
            AiError::RemoteService(message) => {
                assert!(message.contains("502"));
                assert!(message.contains("upstream exploded"));
            }
            other => panic!("expected RemoteService, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_network_call() {
        let backend = GeminiBackend::new(None, "gemini-2.5-flash", "persona");
        let result = backend.generate(&AiRequest::new("hello")).await;
        assert!(matches!(result, Err(AiError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_empty_api_key_counts_as_missing() {
        let backend = GeminiBackend::new(Some(String::new()), "gemini-2.5-flash", "persona");
        let result = backend.generate(&AiRequest::new("hello")).await;
        assert!(matches!(result, Err(AiError::MissingCredential)));
    }
}
