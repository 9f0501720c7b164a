use crate::core::message::{TranscriptRole, TurnEntry};
use crate::core::segment::{render_display, segment, settled_len, Segment};
use crate::core::transcript::TranscriptChange;

pub fn role_label(role: TranscriptRole) -> &'static str {
    match role {
        TranscriptRole::User => "You",
        TranscriptRole::Model => "Gemini",
        TranscriptRole::System => "Note",
    }
}

/// One finished entry as a labelled line block.
pub fn render_entry(entry: &TurnEntry) -> String {
    format!("{}: {}\n", role_label(entry.role), entry.content)
}

/// Frame a code segment for the terminal, labelled with its language.
pub fn frame_code(language: &str, body: &str) -> String {
    let mut out = format!("┌─ {language}\n");
    for line in body.lines() {
        out.push_str("│ ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("└─\n");
    out
}

/// Only the code blocks of `raw`, framed. Empty when there are none.
pub fn render_code_blocks(raw: &str) -> String {
    segment(raw)
        .iter()
        .filter_map(|segment| {
            segment
                .display_language()
                .map(|language| frame_code(language, segment.content()))
        })
        .collect()
}

/// HTML fragment for a model reply. Text segments carry emphasis and line
/// breaks; code bodies stay escaped but otherwise verbatim.
pub fn render_html(raw: &str) -> String {
    let mut html = String::new();
    for segment in render_display(raw) {
        match &segment {
            Segment::Text(text) => {
                html.push_str("<p>");
                html.push_str(text);
                html.push_str("</p>\n");
            }
            Segment::Code { body, .. } => {
                let language = segment.display_language().unwrap_or_default();
                html.push_str(&format!(
                    "<figure><figcaption>{language}</figcaption><pre><code class=\"language-{language}\">{body}</code></pre></figure>\n"
                ));
            }
        }
    }
    html
}

/// Turns transcript notifications into incremental terminal output.
///
/// A streaming model entry is printed once as a label, then its settled text
/// as it grows. The whole reply is re-segmented on every update: prose is
/// printed as it arrives, and a code block is printed framed once its
/// closing fence lands. An open fence is held back until then, or until the
/// entry is final.
#[derive(Debug)]
pub struct StreamEcho {
    /// Bytes of the streaming entry already printed.
    printed: usize,
    labels: bool,
    at_line_start: bool,
}

impl StreamEcho {
    pub fn new() -> Self {
        Self {
            printed: 0,
            labels: true,
            at_line_start: true,
        }
    }

    /// Echo the streamed reply bare, without a role label.
    pub fn plain() -> Self {
        Self {
            labels: false,
            ..Self::new()
        }
    }

    /// Text to print for `change`, if any. User entries are never echoed.
    pub fn on_change(
        &mut self,
        change: TranscriptChange,
        entries: &[TurnEntry],
    ) -> Option<String> {
        let mut out = String::new();
        match change {
            TranscriptChange::Appended(index) => {
                let entry = entries.get(index)?;
                match entry.role {
                    TranscriptRole::User => return None,
                    role if role.is_model() && entry.is_generating() => {
                        self.printed = 0;
                        self.at_line_start = true;
                        if self.labels {
                            self.push_text(&mut out, &format!("{}: ", role_label(role)));
                        }
                        self.stream(&mut out, &entry.content, false);
                    }
                    _ => out = render_entry(entry),
                }
            }
            TranscriptChange::Replaced(index) => out = render_entry(entries.get(index)?),
            TranscriptChange::Updated(index) => {
                let entry = entries.get(index)?;
                self.stream(&mut out, &entry.content, entry.is_final());
            }
        }
        (!out.is_empty()).then_some(out)
    }

    fn stream(&mut self, out: &mut String, content: &str, finished: bool) {
        let segments = segment(content);
        let settled = if finished {
            content.len()
        } else {
            settled_len(content, &segments)
        };

        let mut start = 0;
        for segment in &segments {
            if start >= settled {
                break;
            }
            let end = start + segment.source_len();
            if end > self.printed {
                match segment.display_language() {
                    None => {
                        let from = start.max(self.printed);
                        let to = end.min(settled);
                        self.push_text(out, &content[from..to]);
                        self.printed = to;
                    }
                    Some(language) => {
                        if !self.at_line_start {
                            out.push('\n');
                        }
                        out.push_str(&frame_code(language, segment.content()));
                        self.at_line_start = true;
                        self.printed = end;
                    }
                }
            }
            start = end;
        }

        if finished && !self.at_line_start {
            out.push('\n');
            self.at_line_start = true;
        }
    }

    fn push_text(&mut self, out: &mut String, text: &str) {
        if text.is_empty() {
            return;
        }
        out.push_str(text);
        self.at_line_start = text.ends_with('\n');
    }
}

impl Default for StreamEcho {
    fn default() -> Self {
        Self::new()
    }
}
