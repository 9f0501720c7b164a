//! Model listing functionality

use crate::core::config::data::Config;
use crate::core::session::GeminiModel;

/// One line per model, the configured default marked with `*`.
pub fn format_models(default: GeminiModel) -> String {
    GeminiModel::ALL
        .iter()
        .map(|model| {
            if *model == default {
                format!("* {model} (default)")
            } else {
                format!("  {model}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn list_models(config: &Config) {
    println!("Available models:");
    println!("{}", format_models(config.default_model()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_default_model() {
        let listing = format_models(GeminiModel::Pro25);
        assert_eq!(
            listing,
            "  gemini-2.5-flash\n* gemini-2.5-pro (default)\n  gemini-live-2.5-flash-preview"
        );
    }
}
