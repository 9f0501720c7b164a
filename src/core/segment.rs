//! Splits streamed model text into prose and fenced code.
//!
//! Every function here is stateless and total. The terminal echo re-runs
//! [`segment`] on the whole accumulated buffer after each delta, so a fence
//! only becomes a code segment once its closing backticks arrive;
//! [`settled_len`] tells it how much of the buffer is safe to print.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

const FENCE: &str = "```";

/// Default label for a code block whose fence has no language tag.
pub const UNTAGGED_CODE_LABEL: &str = "code";

static FENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```([A-Za-z0-9_]*)\n((?s:.*?))```").expect("fence pattern is valid")
});

static EMPHASIS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("emphasis pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// `body` excludes both fences; `language` is empty for an untagged fence.
    Code { language: String, body: String },
}

impl Segment {
    pub fn text(content: impl Into<String>) -> Self {
        Segment::Text(content.into())
    }

    pub fn code(language: impl Into<String>, body: impl Into<String>) -> Self {
        Segment::Code {
            language: language.into(),
            body: body.into(),
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Segment::Code { .. })
    }

    /// Raw content, fences stripped.
    pub fn content(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Code { body, .. } => body,
        }
    }

    /// Language label for display, falling back to [`UNTAGGED_CODE_LABEL`].
    pub fn display_language(&self) -> Option<&str> {
        match self {
            Segment::Text(_) => None,
            Segment::Code { language, .. } if language.is_empty() => Some(UNTAGGED_CODE_LABEL),
            Segment::Code { language, .. } => Some(language),
        }
    }

    /// Byte length of the segment in its source form, fences included.
    pub fn source_len(&self) -> usize {
        match self {
            Segment::Text(text) => text.len(),
            Segment::Code { language, body } => 2 * FENCE.len() + language.len() + 1 + body.len(),
        }
    }

    /// Write the segment back in its source form, fences included.
    pub fn write_source(&self, out: &mut String) {
        match self {
            Segment::Text(text) => out.push_str(text),
            Segment::Code { language, body } => {
                out.push_str(FENCE);
                out.push_str(language);
                out.push('\n');
                out.push_str(body);
                out.push_str(FENCE);
            }
        }
    }
}

/// Escape the characters the renderer treats as markup.
pub fn escape_markup(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>']) {
        return Cow::Borrowed(raw);
    }

    let mut escaped = String::with_capacity(raw.len() + 16);
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Split `input` into text and code segments, in input order.
///
/// An opening fence without a matching close is left in the surrounding
/// text untouched. Empty text between adjacent fences is dropped.
pub fn segment(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last_end = 0;

    for captures in FENCE_PATTERN.captures_iter(input) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if whole.start() > last_end {
            segments.push(Segment::text(&input[last_end..whole.start()]));
        }
        let language = captures.get(1).map_or("", |m| m.as_str());
        let body = captures.get(2).map_or("", |m| m.as_str());
        segments.push(Segment::code(language, body));
        last_end = whole.end();
    }

    if last_end < input.len() {
        segments.push(Segment::text(&input[last_end..]));
    }

    segments
}

/// Prose formatting for text segments: `**x**` becomes emphasis and newlines
/// become line breaks. Never apply this to code bodies.
pub fn format_text(text: &str) -> String {
    let emphasized = EMPHASIS_PATTERN.replace_all(text, "<strong>$1</strong>");
    emphasized.replace('\n', "<br>")
}

/// Escape, segment and format a raw buffer for display.
pub fn render_display(raw: &str) -> Vec<Segment> {
    let escaped = escape_markup(raw);
    segment(&escaped)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => Segment::Text(format_text(&text)),
            code => code,
        })
        .collect()
}

/// Length of the prefix of `raw` whose segmentation no further appended
/// text can change. `segments` must be `segment(raw)`.
///
/// Trailing text is cut at its first fence, which is still open, or else
/// before any trailing backticks that may grow into one.
pub fn settled_len(raw: &str, segments: &[Segment]) -> usize {
    let Some(Segment::Text(tail)) = segments.last() else {
        return raw.len();
    };
    let tail_start = raw.len() - tail.len();
    match tail.find(FENCE) {
        Some(open) => tail_start + open,
        None => raw.len() - (tail.len() - tail.trim_end_matches('`').len()),
    }
}

/// Inverse of [`segment`] for well-formed input.
pub fn reassemble(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        segment.write_source(&mut out);
    }
    out
}
