use super::CommandResult;
use crate::core::orchestrator::TurnOrchestrator;

pub type CommandHandler = fn(&mut TurnOrchestrator, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

impl CommandInvocation<'_> {
    pub fn args_text(&self) -> &str {
        self.args.trim()
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "enhance",
        usage: "/enhance <prompt>",
        help: "Rewrite the prompt with the enhancer, then send the rewrite.",
        handler: super::handle_enhance,
    },
    Command {
        name: "send",
        usage: "/send <prompt>",
        help: "Send the prompt as typed, skipping enhancement.",
        handler: super::handle_send,
    },
    Command {
        name: "continue",
        usage: "/continue",
        help: "Ask the model to continue its last answer.",
        handler: super::handle_continue,
    },
    Command {
        name: "model",
        usage: "/model [id]",
        help: "Show the available models or switch to one.",
        handler: super::handle_model,
    },
    Command {
        name: "system",
        usage: "/system [instruction]",
        help: "Show or replace the system instruction.",
        handler: super::handle_system,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
