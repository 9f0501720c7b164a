//! Capabilities the orchestrator drives: prompt enhancement and streamed
//! generation. [`crate::core::chat_stream::GeminiService`] implements both
//! against the Gemini API; tests swap in scripted fakes.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::api::ChatMessage;
use crate::core::chat_stream::StreamMessage;
use crate::core::message::TurnEntry;
use crate::core::session::SessionConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The backend could not be set up (missing key, bad configuration).
    /// Every call fails the same way until it is reconfigured.
    Unavailable(String),
    /// A single call failed.
    Failed(String),
}

impl CapabilityError {
    pub fn message(&self) -> &str {
        match self {
            CapabilityError::Unavailable(message) | CapabilityError::Failed(message) => message,
        }
    }
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for CapabilityError {}

/// Everything a generator needs for one turn.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Prior user/model turns, oldest first. System notes are never included.
    pub history: Vec<ChatMessage>,
    pub prompt: String,
    pub config: SessionConfig,
}

impl GenerationRequest {
    pub fn new(entries: &[TurnEntry], prompt: impl Into<String>, config: SessionConfig) -> Self {
        Self {
            history: history_from_entries(entries),
            prompt: prompt.into(),
            config,
        }
    }
}

/// Convert transcript entries to wire history, skipping system notes and
/// entries with nothing to send.
pub fn history_from_entries(entries: &[TurnEntry]) -> Vec<ChatMessage> {
    entries
        .iter()
        .filter(|entry| !entry.content.is_empty())
        .filter_map(|entry| {
            entry.role.to_api_role().map(|role| ChatMessage {
                role: role.to_string(),
                content: entry.content.clone(),
            })
        })
        .collect()
}

#[async_trait]
pub trait PromptEnhancer: Send + Sync {
    /// Rewrite `prompt` into a more detailed one.
    async fn enhance(&self, prompt: &str) -> Result<String, CapabilityError>;
}

pub trait ResponseGenerator: Send + Sync {
    /// Start a generation and return its message channel.
    ///
    /// The channel yields zero or more `Chunk`s in arrival order, optionally
    /// one `Error`, then `End`. It is not restartable. Failures after the
    /// call returns travel on the channel; only an unusable backend is
    /// reported here.
    fn generate_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<mpsc::UnboundedReceiver<StreamMessage>, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_skips_system_and_empty_entries() {
        let entries = vec![
            TurnEntry::model("Hello! How can I assist you today?"),
            TurnEntry::user("hi"),
            TurnEntry::system("Enhanced Prompt: hi there"),
            TurnEntry::model(""),
            TurnEntry::user("again"),
        ];

        let history = history_from_entries(&entries);

        let pairs: Vec<(&str, &str)> = history
            .iter()
            .map(|m| (m.role.as_str(), m.content.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("model", "Hello! How can I assist you today?"),
                ("user", "hi"),
                ("user", "again"),
            ]
        );
    }

    #[test]
    fn capability_error_displays_message() {
        let err = CapabilityError::Unavailable("no key".into());
        assert_eq!(err.to_string(), "no key");
    }
}
