//! TUI-less "say" command

use std::error::Error;
use std::io::{self, Write};

use crate::cli::{build_orchestrator, SessionOverrides};
use crate::core::config::data::Config;
use crate::ui::render::{render_html, StreamEcho};

pub async fn run_say(
    config: &Config,
    overrides: &SessionOverrides,
    prompt: &str,
    enhance: bool,
    html: bool,
) -> Result<(), Box<dyn Error>> {
    if prompt.trim().is_empty() {
        return Err("Usage: quill say <prompt>".into());
    }

    let mut orchestrator = build_orchestrator(config, overrides)?;
    if !html {
        let mut echo = StreamEcho::plain();
        orchestrator.subscribe_transcript(move |change, entries| {
            if let Some(text) = echo.on_change(change, entries) {
                print!("{text}");
                let _ = io::stdout().flush();
            }
        });
    }

    if enhance {
        orchestrator.submit_enhanced(prompt).await;
    } else {
        orchestrator.submit(prompt).await;
    }

    if let Some(error) = orchestrator.last_error() {
        return Err(error.to_string().into());
    }
    if html {
        print!("{}", render_html(orchestrator.last_response().unwrap_or_default()));
    }
    Ok(())
}
