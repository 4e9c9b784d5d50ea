//! Gemini REST client.
//!
//! Talks to the `generateContent` endpoint. Chat is stateless on the wire:
//! the whole history is sent with every message.

use super::client::ProviderClient;
use super::types::{ChatTurn, PromptPart, Role};
use super::GenerativeModel;
use crate::config::ModelConfig;
use crate::{Error, Result};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const SERVICE: &str = "gemini";

/// Client for the Gemini API.
pub struct GeminiClient {
    client: ProviderClient,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client from model configuration.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| Error::config_key("API key is not a valid header value", "model.api_key"))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = ProviderClient::new(config.base_url.clone(), config.timeout(), headers)?
            .with_retries(config.max_retries);

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    /// Set the initial retry backoff.
    pub fn with_backoff(mut self, backoff: std::time::Duration) -> Self {
        self.client = self.client.with_backoff(backoff);
        self
    }

    fn endpoint(&self) -> String {
        format!("/v1beta/models/{}:generateContent", self.model)
    }

    async fn generate(&self, contents: Vec<Content>) -> Result<String> {
        let request = GenerateRequest { contents };
        let response: GenerateResponse = self
            .client
            .post(&self.endpoint(), &request)
            .await
            .into_result(SERVICE)?;

        response.text()
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate_content(&self, parts: &[PromptPart]) -> Result<String> {
        tracing::debug!(model = %self.model, parts = parts.len(), "generateContent");
        self.generate(vec![Content::new(Role::User, parts)]).await
    }

    async fn send_message(&self, history: &[ChatTurn], message: &str) -> Result<String> {
        tracing::debug!(model = %self.model, turns = history.len(), "chat message");
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content::new(turn.role, &turn.parts))
            .collect();
        contents.push(Content::new(Role::User, &[PromptPart::text(message)]));

        self.generate(contents).await
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn new(role: Role, parts: &[PromptPart]) -> Self {
        let role = match role {
            Role::User => "user",
            Role::Model => "model",
        };
        Self {
            role: role.to_string(),
            parts: parts.iter().map(Part::from).collect(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(
        default,
        alias = "inlineData",
        skip_serializing_if = "Option::is_none"
    )]
    inline_data: Option<Blob>,
}

impl From<&PromptPart> for Part {
    fn from(part: &PromptPart) -> Self {
        match part {
            PromptPart::Text { text } => Part {
                text: Some(text.clone()),
                inline_data: None,
            },
            PromptPart::File { mime_type, data } => Part {
                text: None,
                inline_data: Some(Blob {
                    mime_type: mime_type.clone(),
                    data: BASE64.encode(data),
                }),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Blob {
    #[serde(alias = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate.
    fn text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(Error::integration(SERVICE, format!("prompt blocked: {}", reason)));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::integration(SERVICE, "response contained no candidates"))?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(Error::integration(
                SERVICE,
                format!("response contained no text (finish reason: {})", reason),
            ));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn config_for(server: &MockServer) -> ModelConfig {
        ModelConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            timeout_secs: 5,
            max_retries: 1,
            ..ModelConfig::default()
        }
    }

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(&config_for(server))
            .unwrap()
            .with_backoff(Duration::from_millis(10))
    }

    fn text_response(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_content_sends_inline_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("245.7")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let parts = vec![
            PromptPart::text("Extract usage"),
            PromptPart::file("image/png", b"png-bytes".to_vec()),
        ];
        let text = client.generate_content(&parts).await.unwrap();
        assert_eq!(text, "245.7");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Extract usage");
        assert_eq!(
            body["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
        assert_eq!(
            body["contents"][0]["parts"][1]["inline_data"]["data"],
            BASE64.encode(b"png-bytes")
        );
    }

    #[tokio::test]
    async fn test_send_message_includes_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Try LEDs.")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let history = vec![
            ChatTurn::user_text("bill summary"),
            ChatTurn::model_text("Got it."),
        ];
        let reply = client.send_message(&history, "What next?").await.unwrap();
        assert_eq!(reply, "Try LEDs.");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "What next?");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_content(&[PromptPart::text("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Integration { .. }));
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "promptFeedback": { "blockReason": "SAFETY" } })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_content(&[PromptPart::text("hi")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_content(&[PromptPart::text("hi")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("400"));
    }

    #[tokio::test]
    async fn test_retries_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
            .mount(&server)
            .await;

        let text = client_for(&server)
            .generate_content(&[PromptPart::text("hi")])
            .await
            .unwrap();
        assert_eq!(text, "ok");
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }
}
