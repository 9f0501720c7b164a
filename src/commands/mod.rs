mod registry;

pub use registry::{all_commands, CommandInvocation};

use crate::core::orchestrator::TurnOrchestrator;
use crate::core::session::GeminiModel;

/// What the chat loop should do after a line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    /// Print this to the user; no turn is started.
    Notice(String),
    Submit(String),
    SubmitEnhanced(String),
    ContinueLast,
    Quit,
}

/// Route a line of input. Plain text becomes a turn, enhanced or not per
/// `enhance_by_default`; unknown slash commands are sent as text too.
pub fn process_input(
    orchestrator: &mut TurnOrchestrator,
    input: &str,
    enhance_by_default: bool,
) -> CommandResult {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return CommandResult::Continue;
    }

    let as_message = || {
        if enhance_by_default {
            CommandResult::SubmitEnhanced(trimmed.to_string())
        } else {
            CommandResult::Submit(trimmed.to_string())
        }
    };

    let Some(rest) = trimmed.strip_prefix('/') else {
        return as_message();
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return as_message(),
    };
    let args = parts.next().unwrap_or("").trim();

    match registry::find_command(command_name) {
        Some(command) => (command.handler)(orchestrator, CommandInvocation { args }),
        None => as_message(),
    }
}

pub fn help_text() -> String {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    let mut help = String::from("Commands:\n");
    for command in all_commands() {
        help.push_str(&format!("  {:<width$}  {}\n", command.usage, command.help));
    }
    help.push_str("Anything else is sent to the model.");
    help
}

pub(super) fn handle_help(
    _orchestrator: &mut TurnOrchestrator,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Notice(help_text())
}

pub(super) fn handle_enhance(
    _orchestrator: &mut TurnOrchestrator,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let prompt = invocation.args_text();
    if prompt.is_empty() {
        return CommandResult::Notice("Usage: /enhance <prompt>".to_string());
    }
    CommandResult::SubmitEnhanced(prompt.to_string())
}

pub(super) fn handle_send(
    _orchestrator: &mut TurnOrchestrator,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let prompt = invocation.args_text();
    if prompt.is_empty() {
        return CommandResult::Notice("Usage: /send <prompt>".to_string());
    }
    CommandResult::Submit(prompt.to_string())
}

pub(super) fn handle_continue(
    _orchestrator: &mut TurnOrchestrator,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::ContinueLast
}

pub(super) fn handle_model(
    orchestrator: &mut TurnOrchestrator,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let requested = invocation.args_text();
    if requested.is_empty() {
        let current = orchestrator.session().model();
        let listing = GeminiModel::ALL
            .iter()
            .map(|model| {
                let marker = if *model == current { "*" } else { " " };
                format!("{marker} {model}")
            })
            .collect::<Vec<_>>()
            .join("\n");
        return CommandResult::Notice(listing);
    }

    match requested.parse::<GeminiModel>() {
        Ok(model) => {
            orchestrator.session_mut().set_model(model);
            CommandResult::Notice(format!("Model set to {model}"))
        }
        Err(err) => CommandResult::Notice(err),
    }
}

pub(super) fn handle_system(
    orchestrator: &mut TurnOrchestrator,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let instruction = invocation.args_text();
    if instruction.is_empty() {
        return CommandResult::Notice(format!(
            "System instruction: {}",
            orchestrator.session().system_instruction()
        ));
    }
    orchestrator
        .session_mut()
        .set_system_instruction(instruction);
    CommandResult::Notice("System instruction updated".to_string())
}

pub(super) fn handle_quit(
    _orchestrator: &mut TurnOrchestrator,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Quit
}

#[cfg(test)]
mod tests;
