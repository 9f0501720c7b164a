use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::backend::{CapabilityError, GenerationRequest, PromptEnhancer, ResponseGenerator};
use crate::core::chat_stream::StreamMessage;

/// A successful stream script: one chunk per delta, then `End`.
pub fn chunks(deltas: &[&str]) -> Vec<StreamMessage> {
    deltas
        .iter()
        .map(|delta| StreamMessage::Chunk((*delta).to_string()))
        .chain(std::iter::once(StreamMessage::End))
        .collect()
}

/// Enhancer returning a fixed result and recording its inputs.
pub struct ScriptedEnhancer {
    result: Result<String, CapabilityError>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedEnhancer {
    pub fn succeeding(enhanced: &str) -> Self {
        Self {
            result: Ok(enhanced.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: CapabilityError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PromptEnhancer for ScriptedEnhancer {
    async fn enhance(&self, prompt: &str) -> Result<String, CapabilityError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        self.result.clone()
    }
}

/// Generator that replays one script per call. The whole script is queued
/// before the receiver is handed back and the sender is dropped, so a script
/// without `End` behaves like a connection that closed early.
pub struct ScriptedGenerator {
    scripts: Mutex<VecDeque<Vec<StreamMessage>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    unavailable: Option<String>,
}

impl ScriptedGenerator {
    pub fn new(scripts: Vec<Vec<StreamMessage>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
            unavailable: None,
        }
    }

    pub fn unavailable(message: &str) -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            unavailable: Some(message.to_string()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ResponseGenerator for ScriptedGenerator {
    fn generate_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<mpsc::UnboundedReceiver<StreamMessage>, CapabilityError> {
        if let Some(message) = &self.unavailable {
            return Err(CapabilityError::Unavailable(message.clone()));
        }

        self.requests.lock().unwrap().push(request);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![StreamMessage::End]);

        let (tx, rx) = mpsc::unbounded_channel();
        for message in script {
            let _ = tx.send(message);
        }
        Ok(rx)
    }
}
