use tracing::warn;

use crate::core::config::data::Config;
use crate::core::orchestrator::DEFAULT_GREETING;
use crate::core::session::{GeminiModel, SessionConfig, DEFAULT_SYSTEM_INSTRUCTION};

impl Config {
    /// Configured default model. An unrecognized id falls back to the
    /// built-in default with a warning rather than failing startup.
    pub fn default_model(&self) -> GeminiModel {
        match self.default_model.as_deref() {
            Some(id) => id.parse().unwrap_or_else(|err: String| {
                warn!("{err}; using {}", GeminiModel::default());
                GeminiModel::default()
            }),
            None => GeminiModel::default(),
        }
    }

    pub fn system_instruction(&self) -> &str {
        self.system_instruction
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_INSTRUCTION)
    }

    pub fn enhance_by_default(&self) -> bool {
        self.enhance_by_default.unwrap_or(false)
    }

    /// Greeting to seed new sessions with, if any.
    pub fn greeting(&self) -> Option<&str> {
        let greeting = self.greeting.as_deref().unwrap_or(DEFAULT_GREETING);
        (!greeting.trim().is_empty()).then_some(greeting)
    }

    /// Initial session configuration for a new chat.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.default_model(), self.system_instruction())
    }
}
