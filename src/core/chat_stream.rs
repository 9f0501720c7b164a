//! Gemini REST client: SSE streaming for generation, one-shot calls for
//! prompt enhancement.

use async_trait::async_trait;
use futures_util::StreamExt;
use memchr::memchr;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::core::backend::{CapabilityError, GenerationRequest, PromptEnhancer, ResponseGenerator};
use crate::core::session::GeminiModel;
use crate::utils::url::{model_method_url, stream_generate_url, DEFAULT_BASE_URL};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";
pub const NOT_INITIALIZED: &str = "Gemini service is not initialized.";

/// Enhancement always runs on the fast model, whatever the session uses.
pub const ENHANCEMENT_MODEL: GeminiModel = GeminiModel::Flash25;

const ENHANCEMENT_TEMPLATE: &str = "You are a world-class AI prompt engineer. Your task is to take a user's prompt and refine it to be more detailed, specific, and structured to elicit the most comprehensive and expert-level response from another AI model. Do not answer the prompt. Only output the refined prompt itself, without any introduction or explanation.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    Chunk(String),
    Error(String),
    End,
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn handle_data_payload(payload: &str, tx: &mpsc::UnboundedSender<StreamMessage>) -> bool {
    if payload.trim().is_empty() {
        return false;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(payload) {
        if value.get("error").is_some() {
            let _ = tx.send(StreamMessage::Error(format_api_error(payload)));
            let _ = tx.send(StreamMessage::End);
            return true;
        }

        if let Ok(response) = serde_json::from_value::<GenerateContentResponse>(value) {
            if let Some(reason) = response.abnormal_finish() {
                debug!(reason, "generation finished early");
            }
            let text = response.text();
            if !text.is_empty() {
                let _ = tx.send(StreamMessage::Chunk(text));
            }
            return false;
        }
    }

    let _ = tx.send(StreamMessage::Error(format_api_error(payload)));
    let _ = tx.send(StreamMessage::End);
    true
}

fn process_sse_line(line: &str, tx: &mpsc::UnboundedSender<StreamMessage>) -> bool {
    extract_data_payload(line)
        .map(|payload| handle_data_payload(payload, tx))
        .unwrap_or(false)
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim().to_string()
    })
}

/// Gemini wraps errors in arrays on some endpoints; unwrap a single element.
fn unwrap_error_array(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

pub(crate) fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "API Error:\n```\n<empty>\n```".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let json_value = unwrap_error_array(json_value);
        if let Ok(pretty_json) = serde_json::to_string_pretty(&json_value) {
            if let Some(summary) = extract_error_summary(&json_value) {
                if !summary.is_empty() {
                    return format!("API Error: {}\n```json\n{}\n```", summary, pretty_json);
                }
            }
            return format!("API Error:\n```json\n{}\n```", pretty_json);
        }
    }

    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        format!("API Error:\n```xml\n{}\n```", trimmed)
    } else {
        format!("API Error:\n```\n{}\n```", trimmed)
    }
}

fn build_stream_request(request: &GenerationRequest) -> GenerateContentRequest {
    let mut contents: Vec<Content> = request.history.iter().map(Content::from).collect();
    contents.push(Content::with_role("user", request.prompt.clone()));

    let instruction = request.config.system_instruction().trim();
    GenerateContentRequest {
        contents,
        system_instruction: (!instruction.is_empty()).then(|| Content::text_only(instruction)),
    }
}

fn build_enhancement_request(prompt: &str) -> GenerateContentRequest {
    let text = format!("{ENHANCEMENT_TEMPLATE}\n\nUser prompt: \"{prompt}\"");
    GenerateContentRequest {
        contents: vec![Content::with_role("user", text)],
        system_instruction: None,
    }
}

/// Connection details for the Gemini API.
#[derive(Clone, Debug)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl GeminiSettings {
    /// Read the API key from `GEMINI_API_KEY`, then `API_KEY`.
    pub fn from_env(base_url: Option<&str>) -> Self {
        let api_key = [API_KEY_ENV, FALLBACK_API_KEY_ENV]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());
        Self {
            api_key,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        }
    }
}

/// Both capabilities against the Gemini REST API.
///
/// Construction never fails: a missing key is remembered and every call
/// reports [`CapabilityError::Unavailable`] until a configured service
/// replaces this one.
#[derive(Clone)]
pub struct GeminiService {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiService {
    pub fn new(settings: GeminiSettings) -> Self {
        if settings.api_key.is_none() {
            warn!("no Gemini API key found in {API_KEY_ENV} or {FALLBACK_API_KEY_ENV}");
        }
        Self {
            client: reqwest::Client::new(),
            api_key: settings.api_key,
            base_url: settings.base_url,
        }
    }

    /// Why the service cannot make calls, if it cannot.
    pub fn initialization_error(&self) -> Option<String> {
        self.api_key.is_none().then(|| {
            format!(
                "Failed to initialize Gemini service: {API_KEY_ENV} environment variable not set. Make sure the API key is configured correctly."
            )
        })
    }

    fn api_key(&self) -> Result<&str, CapabilityError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| CapabilityError::Unavailable(NOT_INITIALIZED.to_string()))
    }
}

#[async_trait]
impl PromptEnhancer for GeminiService {
    async fn enhance(&self, prompt: &str) -> Result<String, CapabilityError> {
        let api_key = self.api_key()?;
        let url = model_method_url(&self.base_url, ENHANCEMENT_MODEL.as_str(), "generateContent");
        debug!(model = ENHANCEMENT_MODEL.as_str(), "requesting prompt enhancement");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&build_enhancement_request(prompt))
            .send()
            .await
            .map_err(|e| CapabilityError::Failed(format_api_error(&e.to_string())))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CapabilityError::Failed(format_api_error(&error_text)));
        }

        let body = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| CapabilityError::Failed(e.to_string()))?;
        let enhanced = body.text().trim().to_string();
        if enhanced.is_empty() {
            return Err(CapabilityError::Failed(
                "the model returned an empty prompt".to_string(),
            ));
        }
        Ok(enhanced)
    }
}

impl ResponseGenerator for GeminiService {
    fn generate_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<mpsc::UnboundedReceiver<StreamMessage>, CapabilityError> {
        let api_key = self.api_key()?.to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.client.clone();
        let url = stream_generate_url(&self.base_url, request.config.model().as_str());
        let payload = build_stream_request(&request);

        tokio::spawn(async move {
            debug!(%url, turns = payload.contents.len(), "opening generation stream");
            let http_request = client
                .post(url)
                .header("Content-Type", "application/json")
                .header("x-goog-api-key", api_key);

            match http_request.json(&payload).send().await {
                Ok(response) => {
                    if !response.status().is_success() {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "<no body>".to_string());
                        let _ = tx.send(StreamMessage::Error(format_api_error(&error_text)));
                        let _ = tx.send(StreamMessage::End);
                        return;
                    }

                    let mut stream = response.bytes_stream();
                    let mut buffer: Vec<u8> = Vec::new();

                    while let Some(chunk) = stream.next().await {
                        let chunk_bytes = match chunk {
                            Ok(bytes) => bytes,
                            Err(e) => {
                                let _ = tx.send(StreamMessage::Error(e.to_string()));
                                let _ = tx.send(StreamMessage::End);
                                return;
                            }
                        };
                        buffer.extend_from_slice(&chunk_bytes);

                        while let Some(newline_pos) = memchr(b'\n', &buffer) {
                            let line_str = match std::str::from_utf8(&buffer[..newline_pos]) {
                                Ok(s) => s.trim(),
                                Err(e) => {
                                    warn!("invalid UTF-8 in stream: {e}");
                                    buffer.drain(..=newline_pos);
                                    continue;
                                }
                            };

                            let should_end = process_sse_line(line_str, &tx);
                            buffer.drain(..=newline_pos);
                            if should_end {
                                return;
                            }
                        }
                    }

                    if let Ok(rest) = std::str::from_utf8(&buffer) {
                        if process_sse_line(rest.trim(), &tx) {
                            return;
                        }
                    }

                    debug!("generation stream finished");
                    let _ = tx.send(StreamMessage::End);
                }
                Err(e) => {
                    let _ = tx.send(StreamMessage::Error(format_api_error(&e.to_string())));
                    let _ = tx.send(StreamMessage::End);
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatMessage;
    use crate::core::session::SessionConfig;

    #[test]
    fn process_sse_line_handles_spacing_variants() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let lines = [
            r#"data: {"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#,
            r#"data:{"candidates":[{"content":{"parts":[{"text":"World"}]}}]}"#,
        ];

        for line in lines {
            assert!(!process_sse_line(line, &tx));
        }

        assert_eq!(rx.try_recv().ok(), Some(StreamMessage::Chunk("Hello".into())));
        assert_eq!(rx.try_recv().ok(), Some(StreamMessage::Chunk("World".into())));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn process_sse_line_ignores_non_data_and_empty_chunks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(!process_sse_line(": keep-alive", &tx));
        assert!(!process_sse_line("", &tx));
        assert!(!process_sse_line(
            r#"data: {"candidates":[{"finishReason":"STOP"}],"usageMetadata":{}}"#,
            &tx
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn process_sse_line_routes_stream_errors() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let error_line = r#"data: {"error":{"code":500,"message":"internal error"}}"#;

        assert!(process_sse_line(error_line, &tx));

        match rx.try_recv().expect("expected error message") {
            StreamMessage::Error(text) => {
                assert!(text.starts_with("API Error: internal error\n```json\n"));
            }
            other => panic!("expected error message, got {:?}", other),
        }
        assert_eq!(rx.try_recv().ok(), Some(StreamMessage::End));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn format_api_error_unwraps_single_element_arrays() {
        let raw = r#"[{"error":{"code":400,"message":"API key not valid."}}]"#;
        let formatted = format_api_error(raw);

        let expected = r#"API Error: API key not valid.
```json
{
  "error": {
    "code": 400,
    "message": "API key not valid."
  }
}
```"#;
        assert_eq!(formatted, expected);
    }

    #[test]
    fn format_api_error_handles_xml_and_plaintext() {
        assert_eq!(
            format_api_error("<error>bad</error>"),
            "API Error:\n```xml\n<error>bad</error>\n```"
        );
        assert_eq!(
            format_api_error("api failure"),
            "API Error:\n```\napi failure\n```"
        );
        assert_eq!(format_api_error("  "), "API Error:\n```\n<empty>\n```");
    }

    #[test]
    fn stream_request_appends_prompt_after_history() {
        let request = GenerationRequest {
            history: vec![ChatMessage {
                role: "model".into(),
                content: "Hello!".into(),
            }],
            prompt: "hi".into(),
            config: SessionConfig::new(GeminiModel::Pro25, "be terse"),
        };

        let value = serde_json::to_value(build_stream_request(&request)).expect("serialize");

        assert_eq!(value["contents"][0]["role"], "model");
        assert_eq!(value["contents"][1]["role"], "user");
        assert_eq!(value["contents"][1]["parts"][0]["text"], "hi");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be terse");
    }

    #[test]
    fn blank_system_instruction_is_omitted() {
        let request = GenerationRequest {
            history: Vec::new(),
            prompt: "hi".into(),
            config: SessionConfig::new(GeminiModel::Flash25, "   "),
        };
        let value = serde_json::to_value(build_stream_request(&request)).expect("serialize");
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn enhancement_request_quotes_prompt() {
        let value =
            serde_json::to_value(build_enhancement_request("write a poem")).expect("serialize");
        let text = value["contents"][0]["parts"][0]["text"]
            .as_str()
            .expect("text");
        assert!(text.starts_with("You are a world-class AI prompt engineer."));
        assert!(text.ends_with("User prompt: \"write a poem\""));
    }

    #[tokio::test]
    async fn missing_key_reports_unavailable() {
        let service = GeminiService::new(GeminiSettings {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        });

        assert!(service.initialization_error().is_some());
        assert_eq!(
            service.enhance("hi").await,
            Err(CapabilityError::Unavailable(NOT_INITIALIZED.to_string()))
        );
        let request = GenerationRequest {
            history: Vec::new(),
            prompt: "hi".into(),
            config: SessionConfig::default(),
        };
        assert!(matches!(
            service.generate_stream(request),
            Err(CapabilityError::Unavailable(_))
        ));
    }
}
