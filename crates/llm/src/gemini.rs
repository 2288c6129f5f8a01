use crate::persona::SYSTEM_PROMPT;
use crate::{fallback, GenError, ResponseGenerator};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use domain::ChatMessage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.0-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Generator backed by the Gemini `generateContent` endpoint.
///
/// Only the latest turn goes upstream, prefixed by the fixed persona. Every
/// call failure is classified and mapped to a canned fallback string, so
/// `generate` only errors when there is nothing to reply to.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    api_url: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Points the generator at a different API host. Used by tests.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, MODEL)
    }

    async fn call(&self, prompt: String) -> Result<String, CallFailure> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(CallFailure::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CallFailure::from_status(status.as_u16()));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| CallFailure::Malformed(e.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CallFailure::Malformed("no text in first candidate".to_string()))
    }
}

#[async_trait]
impl ResponseGenerator for GeminiGenerator {
    async fn generate(&self, history: &[ChatMessage]) -> Result<String, GenError> {
        let last = history.last().ok_or(GenError::EmptyHistory)?;
        let prompt = format!("{SYSTEM_PROMPT}\n\nUser: {}\nAssistant:", last.content);

        debug!("sending prompt to {MODEL} ({} chars)", prompt.len());

        match self.call(prompt).await {
            Ok(raw) => {
                info!("received {MODEL} response ({} chars)", raw.len());
                Ok(clean_response(&raw))
            }
            Err(failure) => {
                warn!("generation failed ({failure:?}), serving fallback");
                Ok(failure.fallback().to_string())
            }
        }
    }
}

/// Failure classes for the upstream call, each with its own user-facing
/// fallback text.
#[derive(Debug, PartialEq, Eq)]
enum CallFailure {
    RateLimited,
    Unavailable,
    TimedOut,
    Network,
    Status(u16),
    Malformed(String),
}

impl CallFailure {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            CallFailure::TimedOut
        } else if error.is_connect() {
            CallFailure::Network
        } else {
            CallFailure::Malformed(error.to_string())
        }
    }

    fn from_status(status: u16) -> Self {
        match status {
            429 => CallFailure::RateLimited,
            503 => CallFailure::Unavailable,
            other => CallFailure::Status(other),
        }
    }

    fn fallback(&self) -> &'static str {
        match self {
            CallFailure::RateLimited => fallback::RATE_LIMITED,
            CallFailure::Unavailable => fallback::UNAVAILABLE,
            CallFailure::TimedOut => fallback::TIMED_OUT,
            CallFailure::Network => fallback::CONNECTION,
            CallFailure::Status(_) | CallFailure::Malformed(_) => fallback::GENERIC,
        }
    }
}

/// Strips a leading "Assistant:" label and truncates at the first embedded
/// "User:"/"Human:" turn marker, guarding against the model echoing labels.
fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();

    const LABEL: &str = "assistant:";
    if text.len() >= LABEL.len() && text.as_bytes()[..LABEL.len()].eq_ignore_ascii_case(LABEL.as_bytes())
    {
        text = text[LABEL.len()..].trim_start();
    }

    for marker in ["\nuser:", "\nhuman:"] {
        if let Some(pos) = find_ignore_ascii_case(text, marker) {
            text = &text[..pos];
        }
    }

    text.trim().to_string()
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

// Wire types for the generateContent endpoint.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::MessageRole;
    use mockito::Server;

    const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

    fn history(content: &str) -> Vec<ChatMessage> {
        vec![ChatMessage {
            id: "m1".to_string(),
            role: MessageRole::User,
            content: content.to_string(),
            user_id: "uid-1".to_string(),
            timestamp: Utc::now(),
        }]
    }

    fn generator(server: &Server) -> GeminiGenerator {
        GeminiGenerator::new("test-key")
            .expect("client builds")
            .with_api_url(server.url())
    }

    fn candidate_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn returns_cleaned_model_text() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_body(candidate_body(
                "Assistant: Here is an internship.\nUser: thanks",
            ))
            .create_async()
            .await;

        let reply = generator(&server)
            .generate(&history("find me an internship"))
            .await
            .expect("generates");
        assert_eq!(reply, "Here is an internship.");
    }

    #[tokio::test]
    async fn rate_limit_maps_to_too_many_requests_and_never_errors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(429)
            .create_async()
            .await;

        let reply = generator(&server)
            .generate(&history("hello"))
            .await
            .expect("falls back instead of erroring");
        assert!(reply.to_lowercase().contains("too many requests"));
    }

    #[tokio::test]
    async fn service_unavailable_maps_to_unavailable_text() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(503)
            .create_async()
            .await;

        let reply = generator(&server)
            .generate(&history("hello"))
            .await
            .expect("falls back");
        assert!(reply.contains("temporarily unavailable"));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_generic_apology() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let reply = generator(&server)
            .generate(&history("hello"))
            .await
            .expect("falls back");
        assert_eq!(reply, fallback::GENERIC);
    }

    #[tokio::test]
    async fn empty_history_is_the_only_error() {
        let server = Server::new_async().await;
        let err = generator(&server).generate(&[]).await.expect_err("errors");
        assert!(matches!(err, GenError::EmptyHistory));
    }

    #[test]
    fn clean_response_strips_label_and_truncates_turn_markers() {
        assert_eq!(clean_response("  ASSISTANT: hi there "), "hi there");
        assert_eq!(clean_response("hi\nUser: next question"), "hi");
        assert_eq!(clean_response("hi\nHUMAN: next"), "hi");
        assert_eq!(clean_response("plain reply"), "plain reply");
    }
}
