//! Drives one chat turn at a time: optional enhancement, then a streamed
//! generation accumulated into the transcript.
//!
//! Every front-end goes through [`TurnOrchestrator`]. Capability failures are
//! absorbed here: they finalize the active entry with a notice, land in the
//! error slot and leave the orchestrator idle for the next attempt.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::backend::{CapabilityError, GenerationRequest, PromptEnhancer, ResponseGenerator};
use crate::core::chat_stream::StreamMessage;
use crate::core::message::{EntryStatus, TurnEntry};
use crate::core::session::SessionConfig;
use crate::core::transcript::{Transcript, TranscriptChange};

pub const DEFAULT_GREETING: &str = "Hello! How can I assist you today?";
pub const ENHANCING_PLACEHOLDER: &str = "Enhancing prompt...";
pub const ENHANCED_PROMPT_PREFIX: &str = "Enhanced Prompt: ";
pub const CONTINUE_PROMPT: &str = "Continue";
pub const GENERATION_FAILURE_NOTICE: &str = "Sorry, an error occurred.";
pub const ENHANCEMENT_FAILURE_NOTICE: &str =
    "Prompt enhancement failed. Your prompt was not sent.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Enhancing,
    Generating,
    Error,
}

impl RunState {
    pub fn is_idle(self) -> bool {
        self == RunState::Idle
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The backend is unusable until reconfigured.
    Initialization(String),
    /// Enhancement failed; nothing was sent to the model.
    Enhancement(String),
    /// The stream failed before or after its first delta.
    Generation(String),
}

impl ChatError {
    fn from_enhancement(err: CapabilityError) -> Self {
        match err {
            CapabilityError::Unavailable(message) => ChatError::Initialization(message),
            CapabilityError::Failed(message) => ChatError::Enhancement(message),
        }
    }

    fn from_generation(err: CapabilityError) -> Self {
        match err {
            CapabilityError::Unavailable(message) => ChatError::Initialization(message),
            CapabilityError::Failed(message) => ChatError::Generation(message),
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Initialization(message) => f.write_str(message),
            ChatError::Enhancement(message) => write!(f, "Failed to enhance prompt: {message}"),
            ChatError::Generation(message) => write!(f, "Failed to generate response: {message}"),
        }
    }
}

impl std::error::Error for ChatError {}

type StatusObserver = Box<dyn FnMut(RunState, Option<&ChatError>) + Send>;

pub struct TurnOrchestrator {
    enhancer: Arc<dyn PromptEnhancer>,
    generator: Arc<dyn ResponseGenerator>,
    transcript: Transcript,
    session: SessionConfig,
    state: RunState,
    last_error: Option<ChatError>,
    last_response: Option<String>,
    status_observers: Vec<StatusObserver>,
}

impl TurnOrchestrator {
    pub fn new(
        enhancer: Arc<dyn PromptEnhancer>,
        generator: Arc<dyn ResponseGenerator>,
        session: SessionConfig,
    ) -> Self {
        Self {
            enhancer,
            generator,
            transcript: Transcript::new(),
            session,
            state: RunState::Idle,
            last_error: None,
            last_response: None,
            status_observers: Vec::new(),
        }
    }

    /// Use one backend for both capabilities.
    pub fn with_backend<B>(backend: Arc<B>, session: SessionConfig) -> Self
    where
        B: PromptEnhancer + ResponseGenerator + 'static,
    {
        let enhancer: Arc<dyn PromptEnhancer> = backend.clone();
        let generator: Arc<dyn ResponseGenerator> = backend;
        Self::new(enhancer, generator, session)
    }

    /// Seed the transcript with a model greeting. Sent as history like any
    /// other model turn.
    pub fn greet(&mut self, greeting: &str) {
        if !greeting.trim().is_empty() && self.transcript.is_empty() {
            self.transcript.append(TurnEntry::model(greeting));
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn subscribe_transcript<F>(&mut self, observer: F)
    where
        F: FnMut(TranscriptChange, &[TurnEntry]) + Send + 'static,
    {
        self.transcript.subscribe(observer);
    }

    /// Called on every run state change with the current error slot.
    pub fn subscribe_status<F>(&mut self, observer: F)
    where
        F: FnMut(RunState, Option<&ChatError>) + Send + 'static,
    {
        self.status_observers.push(Box::new(observer));
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionConfig {
        &mut self.session
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn last_error(&self) -> Option<&ChatError> {
        self.last_error.as_ref()
    }

    /// Final text of the most recent turn that completed without error.
    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// Send `prompt` and stream the reply into the transcript.
    ///
    /// Does nothing for a blank prompt or while another turn is running.
    pub async fn submit(&mut self, prompt: &str) {
        let prompt = prompt.trim();
        if prompt.is_empty() || !self.state.is_idle() {
            debug!(state = ?self.state, "ignoring submit");
            return;
        }

        self.clear_error();
        let request = GenerationRequest::new(
            self.transcript.entries(),
            prompt,
            self.session.snapshot(),
        );
        self.transcript.append(TurnEntry::user(prompt));
        self.set_state(RunState::Generating);
        self.transcript.append(TurnEntry::generating());
        self.run_generation(request).await;
    }

    /// Enhance `prompt` first, show the rewrite as a system note, then send
    /// the rewrite. On enhancement failure nothing is sent.
    pub async fn submit_enhanced(&mut self, prompt: &str) {
        let prompt = prompt.trim();
        if prompt.is_empty() || !self.state.is_idle() {
            debug!(state = ?self.state, "ignoring enhanced submit");
            return;
        }

        self.clear_error();
        self.set_state(RunState::Enhancing);
        self.transcript
            .append(TurnEntry::enhancing(ENHANCING_PLACEHOLDER));

        let enhanced = match self.enhancer.enhance(prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                self.fail_enhancement(CapabilityError::Failed(
                    "the model returned an empty prompt".to_string(),
                ));
                return;
            }
            Err(err) => {
                self.fail_enhancement(err);
                return;
            }
        };

        debug!(chars = enhanced.len(), "prompt enhanced");
        self.transcript.replace_last(
            TurnEntry::is_enhancing,
            TurnEntry::system(format!("{ENHANCED_PROMPT_PREFIX}{enhanced}")),
        );
        self.set_state(RunState::Idle);
        self.submit(&enhanced).await;
    }

    /// Ask the model to keep going. A plain resubmission, nothing more.
    pub async fn continue_last(&mut self) {
        self.submit(CONTINUE_PROMPT).await;
    }

    async fn run_generation(&mut self, request: GenerationRequest) {
        debug!(
            model = request.config.model().as_str(),
            history = request.history.len(),
            "starting generation"
        );
        let mut rx = match self.generator.generate_stream(request) {
            Ok(rx) => rx,
            Err(err) => {
                self.fail_generation(ChatError::from_generation(err));
                return;
            }
        };

        let mut failure = None;
        while let Some(message) = rx.recv().await {
            match message {
                StreamMessage::Chunk(delta) => {
                    if delta.is_empty() {
                        continue;
                    }
                    self.transcript
                        .update_last(|entry| entry.content.push_str(&delta));
                }
                StreamMessage::Error(message) => {
                    failure = Some(message);
                    break;
                }
                StreamMessage::End => break,
            }
        }

        match failure {
            Some(message) => self.fail_generation(ChatError::Generation(message)),
            None => self.finish_generation(),
        }
    }

    fn finish_generation(&mut self) {
        let mut response = String::new();
        self.transcript.update_last(|entry| {
            entry.status = EntryStatus::Final;
            response = entry.content.clone();
        });
        debug!(chars = response.len(), "generation finished");
        self.last_response = Some(response);
        self.set_state(RunState::Idle);
    }

    fn fail_generation(&mut self, error: ChatError) {
        self.transcript.update_last(|entry| {
            if !entry.content.is_empty() {
                entry.content.push_str("\n\n");
            }
            entry.content.push_str(GENERATION_FAILURE_NOTICE);
            entry.status = EntryStatus::Final;
        });
        self.record_failure(error);
    }

    fn fail_enhancement(&mut self, err: CapabilityError) {
        self.transcript.replace_last(
            TurnEntry::is_enhancing,
            TurnEntry::system(ENHANCEMENT_FAILURE_NOTICE),
        );
        self.record_failure(ChatError::from_enhancement(err));
    }

    fn record_failure(&mut self, error: ChatError) {
        warn!("{error}");
        self.last_error = Some(error);
        self.set_state(RunState::Error);
        self.set_state(RunState::Idle);
    }

    fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn set_state(&mut self, state: RunState) {
        if self.state == state {
            return;
        }
        self.state = state;
        for observer in &mut self.status_observers {
            observer(state, self.last_error.as_ref());
        }
    }
}
