//! URL helpers for Gemini endpoints.
//!
//! Base URLs from config or the environment may carry trailing slashes;
//! everything here normalizes them before joining.

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Normalize a base URL by removing trailing slashes
///
/// ```
/// use quill::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://example.com/v1beta/"), "https://example.com/v1beta");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path without doubling slashes.
///
/// ```
/// use quill::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://example.com/v1beta/", "/models"),
///     "https://example.com/v1beta/models"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// URL of a model method, e.g. `models/gemini-2.5-flash:generateContent`.
pub fn model_method_url(base_url: &str, model: &str, method: &str) -> String {
    construct_api_url(base_url, &format!("models/{model}:{method}"))
}

/// Streaming endpoint for `model`, in server-sent-event mode.
pub fn stream_generate_url(base_url: &str, model: &str) -> String {
    format!(
        "{}?alt=sse",
        model_method_url(base_url, model, "streamGenerateContent")
    )
}
