use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User defaults persisted between runs. Conversations are never stored here.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Model id used when a session starts (e.g., "gemini-2.5-pro")
    pub default_model: Option<String>,
    /// System instruction sent with every generation call
    pub system_instruction: Option<String>,
    /// Route prompts through the enhancer unless asked otherwise
    pub enhance_by_default: Option<bool>,
    /// Opening model message; an empty string disables it
    pub greeting: Option<String>,
    /// Override for the Gemini API base URL
    pub base_url: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/quill/config.toml` → `~/.config/quill/config.toml`
/// - Windows: paths are shown unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
