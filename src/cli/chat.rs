//! Interactive line-based chat.

use std::error::Error;
use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::{build_orchestrator, SessionOverrides};
use crate::commands::{process_input, CommandResult};
use crate::core::config::data::Config;
use crate::core::orchestrator::{RunState, TurnOrchestrator};
use crate::ui::render::{render_code_blocks, StreamEcho};

const PROMPT: &str = "> ";

pub async fn run_chat(
    config: &Config,
    overrides: &SessionOverrides,
    enhance_by_default: bool,
) -> Result<(), Box<dyn Error>> {
    let mut orchestrator = build_orchestrator(config, overrides)?;

    let mut echo = StreamEcho::new();
    orchestrator.subscribe_transcript(move |change, entries| {
        if let Some(text) = echo.on_change(change, entries) {
            print!("{text}");
            let _ = io::stdout().flush();
        }
    });
    orchestrator.subscribe_status(|state, error| {
        if let (RunState::Error, Some(error)) = (state, error) {
            eprintln!("❌ {error}");
        }
    });

    if let Some(greeting) = config.greeting() {
        orchestrator.greet(greeting);
    }
    println!(
        "Model: {}. Type /help for commands.",
        orchestrator.session().model()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match process_input(&mut orchestrator, &line, enhance_by_default) {
            CommandResult::Continue => {}
            CommandResult::Notice(message) => println!("{message}"),
            CommandResult::Submit(prompt) => {
                orchestrator.submit(&prompt).await;
                show_code_blocks(&orchestrator);
            }
            CommandResult::SubmitEnhanced(prompt) => {
                orchestrator.submit_enhanced(&prompt).await;
                show_code_blocks(&orchestrator);
            }
            CommandResult::ContinueLast => {
                orchestrator.continue_last().await;
                show_code_blocks(&orchestrator);
            }
            CommandResult::Quit => break,
        }
    }

    Ok(())
}

/// After a successful turn, list the reply's code blocks with their labels.
fn show_code_blocks(orchestrator: &TurnOrchestrator) {
    if orchestrator.last_error().is_some() {
        return;
    }
    let Some(response) = orchestrator.last_response() else {
        return;
    };
    let blocks = render_code_blocks(response);
    if !blocks.is_empty() {
        println!("\nCode blocks:\n{blocks}");
    }
}
