use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful and highly skilled AI assistant. Your answers are always detailed and well-structured.";

/// Models the session can target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GeminiModel {
    #[default]
    Flash25,
    Pro25,
    LiveFlash25Preview,
}

impl GeminiModel {
    pub const ALL: [GeminiModel; 3] = [
        GeminiModel::Flash25,
        GeminiModel::Pro25,
        GeminiModel::LiveFlash25Preview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GeminiModel::Flash25 => "gemini-2.5-flash",
            GeminiModel::Pro25 => "gemini-2.5-pro",
            GeminiModel::LiveFlash25Preview => "gemini-live-2.5-flash-preview",
        }
    }
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeminiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        GeminiModel::ALL
            .into_iter()
            .find(|model| model.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                let known = GeminiModel::ALL.map(GeminiModel::as_str).join(", ");
                format!("unknown model: {trimmed} (expected one of {known})")
            })
    }
}

/// Model selection and system instruction for the current session.
///
/// The orchestrator takes a snapshot when it opens a stream; changes made
/// afterwards apply to the next turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    model: GeminiModel,
    system_instruction: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: GeminiModel::default(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new(model: GeminiModel, system_instruction: impl Into<String>) -> Self {
        Self {
            model,
            system_instruction: system_instruction.into(),
        }
    }

    pub fn set_model(&mut self, model: GeminiModel) {
        self.model = model;
    }

    pub fn set_system_instruction(&mut self, instruction: impl Into<String>) {
        self.system_instruction = instruction.into();
    }

    pub fn model(&self) -> GeminiModel {
        self.model
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn snapshot(&self) -> SessionConfig {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_model() {
        let config = SessionConfig::default();
        assert_eq!(config.model(), GeminiModel::Flash25);
        assert_eq!(config.system_instruction(), DEFAULT_SYSTEM_INSTRUCTION);
    }

    #[test]
    fn setters_update_values() {
        let mut config = SessionConfig::default();
        config.set_model(GeminiModel::Pro25);
        config.set_system_instruction("be terse");
        assert_eq!(config.model().as_str(), "gemini-2.5-pro");
        assert_eq!(config.system_instruction(), "be terse");
    }

    #[test]
    fn model_ids_parse() {
        assert_eq!(
            "gemini-live-2.5-flash-preview".parse::<GeminiModel>(),
            Ok(GeminiModel::LiveFlash25Preview)
        );
        assert_eq!(" GEMINI-2.5-FLASH ".parse::<GeminiModel>(), Ok(GeminiModel::Flash25));
        let err = "gpt-4o".parse::<GeminiModel>().unwrap_err();
        assert!(err.contains("gemini-2.5-pro"));
    }
}
