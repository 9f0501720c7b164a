//! Settings management for `quill config set|unset|show`.
//!
//! Each configurable key has a handler; the registry maps keys to handlers
//! and fixes the order they are listed in.

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use std::path::Path;

use crate::core::config::data::Config;

/// Context provided to setting handlers during set/unset operations.
pub struct SetContext<'a> {
    pub config_path: &'a Path,
}

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the value from the words given after the key and return a
    /// success message.
    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError>;

    /// Clear the value so the built-in default applies again.
    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError>;

    /// Format the current value for display in `quill config show` output.
    fn format(&self, config: &Config) -> String;
}

pub fn set_value(
    registry: &SettingRegistry,
    key: &str,
    args: &[String],
    ctx: &SetContext<'_>,
) -> Result<String, SettingError> {
    registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?
        .set(args, ctx)
}

pub fn unset_value(
    registry: &SettingRegistry,
    key: &str,
    ctx: &SetContext<'_>,
) -> Result<String, SettingError> {
    registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?
        .unset(ctx)
}

/// Every setting with its current value, one per line.
pub fn describe_all(registry: &SettingRegistry, config: &Config) -> String {
    registry
        .keys_display_order()
        .iter()
        .filter_map(|key| registry.get(key))
        .map(|handler| handler.format(config))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::helpers::{parse_bool, truncate_with_ellipsis};
    use super::*;
    use tempfile::TempDir;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn truncate_flattens_and_shortens() {
        assert_eq!(truncate_with_ellipsis("a\nb", 10), "a b");
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
    }

    #[test]
    fn set_and_unset_round_trip_through_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        let ctx = SetContext { config_path: &path };
        let registry = SettingRegistry::new();

        let message = set_value(&registry, "enhance", &args(&["on"]), &ctx).expect("set enhance");
        assert_eq!(message, "✅ Set enhance to: on");
        set_value(
            &registry,
            "system-instruction",
            &args(&["answer", "in", "French"]),
            &ctx,
        )
        .expect("set system instruction");
        set_value(&registry, "default-model", &args(&["Gemini-2.5-Pro"]), &ctx)
            .expect("set model");

        let config = Config::load_from_path(&path).expect("load");
        assert_eq!(config.enhance_by_default, Some(true));
        assert_eq!(config.system_instruction.as_deref(), Some("answer in French"));
        assert_eq!(config.default_model.as_deref(), Some("gemini-2.5-pro"));

        unset_value(&registry, "system-instruction", &ctx).expect("unset");
        let config = Config::load_from_path(&path).expect("reload");
        assert_eq!(config.system_instruction, None);
        assert_eq!(config.enhance_by_default, Some(true));
    }

    #[test]
    fn rejects_bad_input_without_writing() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        let ctx = SetContext { config_path: &path };
        let registry = SettingRegistry::new();

        assert!(matches!(
            set_value(&registry, "theme", &args(&["dark"]), &ctx),
            Err(SettingError::UnknownKey(_))
        ));
        assert!(matches!(
            set_value(&registry, "enhance", &args(&["sometimes"]), &ctx),
            Err(SettingError::InvalidBoolean(_))
        ));
        assert!(matches!(
            set_value(&registry, "default-model", &args(&["gpt-4o"]), &ctx),
            Err(SettingError::UnknownModel(_))
        ));
        assert!(matches!(
            set_value(&registry, "greeting", &[], &ctx),
            Err(SettingError::MissingArgs { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn describe_all_lists_keys_in_order() {
        let registry = SettingRegistry::new();
        let config = Config {
            enhance_by_default: Some(true),
            ..Default::default()
        };
        let lines: Vec<String> = describe_all(&registry, &config)
            .lines()
            .map(str::to_string)
            .collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("  default-model: (unset, default: gemini-2.5-flash)"));
        assert_eq!(lines[2], "  enhance: on");
        assert!(lines[4].starts_with("  base-url: (unset, default: https://generativelanguage"));
    }
}
