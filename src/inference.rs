// linkhub-backend/src/inference.rs
//
// Client for the hosted model provider behind the meeting-notes analyzer.
// One chat call per submission, JSON output enforced, no retry: a transport
// failure, a non-2xx status and schema-invalid output all surface as the
// same provider error.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default chat endpoint (Ollama-compatible).
pub const DEFAULT_LLM_URL: &str = "http://localhost:11434";

/// Default generation model.
pub const DEFAULT_LLM_MODEL: &str = "llama3.1:8b";

/// Default request timeout (seconds).
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

/// Minimum trimmed length of submitted meeting notes.
pub const MIN_NOTES_LEN: usize = 10;

const ANALYZE_SYSTEM_PROMPT: &str = "\
You are an AI assistant specializing in analyzing meeting notes.

Your task is to extract key information from the meeting notes and suggest:
- possible dates for upcoming events related to the meeting,
- people who should be invited to these events,
- tasks that need to be done following the meeting.

Respond with a single JSON object containing exactly three string-array \
fields: \"suggested_dates\", \"suggested_invitees\" and \"suggested_tasks\". \
Use an empty array when the notes contain no matching information.";

/// Structured suggestions extracted from free-form meeting notes.
/// All three arrays are always present on success; all-empty is a valid
/// result, not an error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MeetingNotesAnalysis {
    pub suggested_dates: Vec<String>,
    pub suggested_invitees: Vec<String>,
    pub suggested_tasks: Vec<String>,
}

#[derive(Debug)]
pub enum AnalyzeError {
    /// Input rejected before any provider call was made.
    Validation(String),
    /// Transport failure, provider error status, or schema-invalid output.
    Provider(String),
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalyzeError::Validation(msg) => write!(f, "Validation: {}", msg),
            AnalyzeError::Provider(msg) => write!(f, "Provider: {}", msg),
        }
    }
}

/// Chat API message for `/api/chat`.
#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Request payload for the chat endpoint. `format: "json"` makes the
/// provider return syntactically valid JSON in the message content.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    format: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

pub struct NotesAnalyzer {
    client: Client,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl NotesAnalyzer {
    /// Create an analyzer with explicit configuration.
    pub fn with_config(base_url: String, model: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        log::info!(
            "Initializing notes analyzer: url={}, model={}, timeout={}s",
            base_url,
            model,
            timeout_secs
        );

        Self {
            client,
            base_url,
            model,
            timeout_secs,
        }
    }

    /// Create from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("NOTES_LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_LLM_URL.to_string());
        let model =
            std::env::var("NOTES_LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string());
        let timeout_secs = std::env::var("NOTES_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS);

        Self::with_config(base_url, model, timeout_secs)
    }

    /// Validate the notes, run the single extraction call and parse the
    /// reply against the three-array schema.
    pub async fn analyze_meeting_notes(
        &self,
        meeting_notes: &str,
    ) -> Result<MeetingNotesAnalysis, AnalyzeError> {
        let notes = meeting_notes.trim();
        if notes.chars().count() < MIN_NOTES_LEN {
            return Err(AnalyzeError::Validation(format!(
                "Meeting notes must be at least {} characters.",
                MIN_NOTES_LEN
            )));
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: ANALYZE_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("Meeting Notes: {}", notes),
                },
            ],
            stream: false,
            format: serde_json::json!("json"),
        };

        log::debug!(
            "Submitting meeting notes to model provider (len={})",
            notes.len()
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzeError::Provider(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::Provider(format!(
                "Model provider returned {}: {}",
                status, body
            )));
        }

        let reply: ChatResponse = response.json().await.map_err(|e| {
            AnalyzeError::Provider(format!("Failed to parse provider response: {}", e))
        })?;

        serde_json::from_str::<MeetingNotesAnalysis>(&reply.message.content).map_err(|e| {
            AnalyzeError::Provider(format!(
                "Model output did not match the expected schema: {}",
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_reply(content: &str) -> serde_json::Value {
        serde_json::json!({
            "message": { "role": "assistant", "content": content }
        })
    }

    #[tokio::test]
    async fn canned_response_passes_through_unchanged() {
        let server = MockServer::start().await;
        let content = r#"{"suggested_dates":["May 15"],"suggested_invitees":["Alice","Bob","Carol"],"suggested_tasks":["follow up with Bob"]}"#;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(content)))
            .expect(1)
            .mount(&server)
            .await;

        let analyzer = NotesAnalyzer::with_config(server.uri(), "test-model".to_string(), 5);
        let result = analyzer
            .analyze_meeting_notes(
                "Team sync on May 15. Alice to follow up with Bob. Invite Carol.",
            )
            .await
            .unwrap();

        assert_eq!(result.suggested_dates, vec!["May 15"]);
        assert_eq!(result.suggested_invitees, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(result.suggested_tasks, vec!["follow up with Bob"]);
    }

    #[tokio::test]
    async fn all_empty_arrays_are_a_valid_result() {
        let server = MockServer::start().await;
        let content = r#"{"suggested_dates":[],"suggested_invitees":[],"suggested_tasks":[]}"#;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(content)))
            .mount(&server)
            .await;

        let analyzer = NotesAnalyzer::with_config(server.uri(), "test-model".to_string(), 5);
        let result = analyzer
            .analyze_meeting_notes("Nothing actionable was discussed today.")
            .await
            .unwrap();

        assert!(result.suggested_dates.is_empty());
        assert!(result.suggested_invitees.is_empty());
        assert!(result.suggested_tasks.is_empty());
    }

    #[tokio::test]
    async fn short_input_fails_validation_without_calling_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("{}")))
            .expect(0)
            .mount(&server)
            .await;

        let analyzer = NotesAnalyzer::with_config(server.uri(), "test-model".to_string(), 5);
        let err = analyzer.analyze_meeting_notes("ab").await.unwrap_err();

        assert!(matches!(err, AnalyzeError::Validation(_)));
    }

    #[tokio::test]
    async fn whitespace_padding_does_not_satisfy_the_minimum() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("{}")))
            .expect(0)
            .mount(&server)
            .await;

        let analyzer = NotesAnalyzer::with_config(server.uri(), "test-model".to_string(), 5);
        let err = analyzer
            .analyze_meeting_notes("   notes   \n\n        ")
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::Validation(_)));
    }

    #[tokio::test]
    async fn malformed_output_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chat_reply("not json at all")),
            )
            .mount(&server)
            .await;

        let analyzer = NotesAnalyzer::with_config(server.uri(), "test-model".to_string(), 5);
        let err = analyzer
            .analyze_meeting_notes("A perfectly reasonable set of meeting notes.")
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::Provider(_)));
    }

    #[tokio::test]
    async fn missing_array_is_a_provider_error() {
        let server = MockServer::start().await;
        let content = r#"{"suggested_dates":["May 15"]}"#;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(content)))
            .mount(&server)
            .await;

        let analyzer = NotesAnalyzer::with_config(server.uri(), "test-model".to_string(), 5);
        let err = analyzer
            .analyze_meeting_notes("A perfectly reasonable set of meeting notes.")
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::Provider(_)));
    }

    #[tokio::test]
    async fn provider_error_status_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let analyzer = NotesAnalyzer::with_config(server.uri(), "test-model".to_string(), 5);
        let err = analyzer
            .analyze_meeting_notes("A perfectly reasonable set of meeting notes.")
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::Provider(_)));
    }
}
