//! Handlers for each configurable key.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{format_bool, mutate_config, parse_bool, truncate_with_ellipsis};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::data::Config;
use crate::core::session::GeminiModel;

/// Data-driven handler for boolean (on/off) settings.
pub struct BooleanHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: &'static str,
    get: fn(&Config) -> Option<bool>,
    set_field: fn(&mut Config, Option<bool>),
}

impl SettingHandler for BooleanHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let input = args.join(" ");
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        let set_field = self.set_field;

        mutate_config(ctx.config_path, move |config| {
            set_field(config, Some(value));
            Ok(())
        })?;

        Ok(format!("✅ Set {} to: {}", self.key, format_bool(value)))
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let set_field = self.set_field;

        mutate_config(ctx.config_path, move |config| {
            set_field(config, None);
            Ok(())
        })?;

        Ok(format!(
            "✅ Unset {} (will use default: {})",
            self.key, self.default_display
        ))
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {}", self.key, format_bool(value)),
            None => format!("  {}: (unset, default: {})", self.key, self.default_display),
        }
    }
}

pub fn enhance_handler() -> BooleanHandler {
    BooleanHandler {
        key: "enhance",
        hint: "To enhance prompts before sending them, specify on or off:",
        example: "quill config set enhance on",
        default_display: "off",
        get: |c| c.enhance_by_default,
        set_field: |c, v| c.enhance_by_default = v,
    }
}

/// Data-driven handler for free-text settings. Multi-word values are
/// joined with spaces.
pub struct TextHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: fn() -> String,
    get: fn(&Config) -> Option<&str>,
    set_field: fn(&mut Config, Option<String>),
}

impl SettingHandler for TextHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let value = args.join(" ");
        if value.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let display = truncate_with_ellipsis(&value, 50);
        let set_field = self.set_field;
        mutate_config(ctx.config_path, move |config| {
            set_field(config, Some(value));
            Ok(())
        })?;

        Ok(format!("✅ Set {} to: {display}", self.key))
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let set_field = self.set_field;
        mutate_config(ctx.config_path, move |config| {
            set_field(config, None);
            Ok(())
        })?;

        Ok(format!("✅ Unset {} (will use default)", self.key))
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {}", self.key, truncate_with_ellipsis(value, 50)),
            None => format!(
                "  {}: (unset, default: {})",
                self.key,
                truncate_with_ellipsis(&(self.default_display)(), 40)
            ),
        }
    }
}

pub fn system_instruction_handler() -> TextHandler {
    TextHandler {
        key: "system-instruction",
        hint: "To set the system instruction, provide the instruction text:",
        example: "quill config set system-instruction \"Answer briefly.\"",
        default_display: || Config::default().system_instruction().to_string(),
        get: |c| c.system_instruction.as_deref(),
        set_field: |c, v| c.system_instruction = v,
    }
}

pub fn greeting_handler() -> TextHandler {
    TextHandler {
        key: "greeting",
        hint: "To set the opening greeting, provide the text:",
        example: "quill config set greeting \"What are we building today?\"",
        default_display: || Config::default().greeting().unwrap_or_default().to_string(),
        get: |c| c.greeting.as_deref(),
        set_field: |c, v| c.greeting = v,
    }
}

pub fn base_url_handler() -> TextHandler {
    TextHandler {
        key: "base-url",
        hint: "To point quill at another endpoint, provide its base URL:",
        example: "quill config set base-url http://localhost:8080/v1beta",
        default_display: || crate::utils::url::DEFAULT_BASE_URL.to_string(),
        get: |c| c.base_url.as_deref(),
        set_field: |c, v| c.base_url = v,
    }
}

/// Handler for `default-model`; only known model ids are accepted.
pub struct DefaultModelHandler;

impl SettingHandler for DefaultModelHandler {
    fn key(&self) -> &'static str {
        "default-model"
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let Some(input) = args.first() else {
            return Err(SettingError::MissingArgs {
                hint: "To set a default model, specify its id:",
                example: "quill config set default-model gemini-2.5-pro",
            });
        };

        let model: GeminiModel = input.parse().map_err(SettingError::UnknownModel)?;
        mutate_config(ctx.config_path, move |config| {
            config.default_model = Some(model.as_str().to_string());
            Ok(())
        })?;

        Ok(format!("✅ Set default-model to: {model}"))
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        mutate_config(ctx.config_path, |config| {
            config.default_model = None;
            Ok(())
        })?;

        Ok(format!(
            "✅ Unset default-model (will use default: {})",
            GeminiModel::default()
        ))
    }

    fn format(&self, config: &Config) -> String {
        match &config.default_model {
            Some(model) => format!("  default-model: {model}"),
            None => format!(
                "  default-model: (unset, default: {})",
                GeminiModel::default()
            ),
        }
    }
}
