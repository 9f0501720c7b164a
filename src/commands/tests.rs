use super::*;
use crate::core::session::SessionConfig;
use crate::utils::test_utils::{ScriptedEnhancer, ScriptedGenerator};
use std::sync::Arc;

fn create_test_orchestrator() -> TurnOrchestrator {
    TurnOrchestrator::new(
        Arc::new(ScriptedEnhancer::succeeding("unused")),
        Arc::new(ScriptedGenerator::new(Vec::new())),
        SessionConfig::new(GeminiModel::Flash25, "be terse"),
    )
}

#[test]
fn plain_text_is_submitted() {
    let mut orchestrator = create_test_orchestrator();
    assert_eq!(
        process_input(&mut orchestrator, "  hello there ", false),
        CommandResult::Submit("hello there".to_string())
    );
}

#[test]
fn plain_text_is_enhanced_when_enabled() {
    let mut orchestrator = create_test_orchestrator();
    assert_eq!(
        process_input(&mut orchestrator, "hello", true),
        CommandResult::SubmitEnhanced("hello".to_string())
    );
}

#[test]
fn blank_input_does_nothing() {
    let mut orchestrator = create_test_orchestrator();
    assert_eq!(
        process_input(&mut orchestrator, "   ", true),
        CommandResult::Continue
    );
}

#[test]
fn unknown_command_is_sent_as_text() {
    let mut orchestrator = create_test_orchestrator();
    assert_eq!(
        process_input(&mut orchestrator, "/etc/hosts looks odd", false),
        CommandResult::Submit("/etc/hosts looks odd".to_string())
    );
    assert_eq!(
        process_input(&mut orchestrator, "/", false),
        CommandResult::Submit("/".to_string())
    );
}

#[test]
fn explicit_send_and_enhance_override_default() {
    let mut orchestrator = create_test_orchestrator();
    assert_eq!(
        process_input(&mut orchestrator, "/send raw prompt", true),
        CommandResult::Submit("raw prompt".to_string())
    );
    assert_eq!(
        process_input(&mut orchestrator, "/ENHANCE make it better", false),
        CommandResult::SubmitEnhanced("make it better".to_string())
    );
}

#[test]
fn send_and_enhance_require_a_prompt() {
    let mut orchestrator = create_test_orchestrator();
    assert_eq!(
        process_input(&mut orchestrator, "/send", false),
        CommandResult::Notice("Usage: /send <prompt>".to_string())
    );
    assert_eq!(
        process_input(&mut orchestrator, "/enhance   ", false),
        CommandResult::Notice("Usage: /enhance <prompt>".to_string())
    );
}

#[test]
fn continue_and_quit_map_to_actions() {
    let mut orchestrator = create_test_orchestrator();
    assert_eq!(
        process_input(&mut orchestrator, "/continue", false),
        CommandResult::ContinueLast
    );
    assert_eq!(
        process_input(&mut orchestrator, "/quit", false),
        CommandResult::Quit
    );
}

#[test]
fn help_lists_every_command() {
    let mut orchestrator = create_test_orchestrator();
    let CommandResult::Notice(help) = process_input(&mut orchestrator, "/help", false) else {
        panic!("expected a notice");
    };
    for command in all_commands() {
        assert!(help.contains(command.usage), "missing {}", command.usage);
    }
}

#[test]
fn model_without_args_marks_current() {
    let mut orchestrator = create_test_orchestrator();
    let CommandResult::Notice(listing) = process_input(&mut orchestrator, "/model", false) else {
        panic!("expected a notice");
    };
    assert!(listing.contains("* gemini-2.5-flash"));
    assert!(listing.contains("  gemini-2.5-pro"));
}

#[test]
fn model_switches_session() {
    let mut orchestrator = create_test_orchestrator();
    let result = process_input(&mut orchestrator, "/model gemini-2.5-pro", false);
    assert_eq!(
        result,
        CommandResult::Notice("Model set to gemini-2.5-pro".to_string())
    );
    assert_eq!(orchestrator.session().model(), GeminiModel::Pro25);
}

#[test]
fn unknown_model_leaves_session_unchanged() {
    let mut orchestrator = create_test_orchestrator();
    let result = process_input(&mut orchestrator, "/model gpt-4o", false);
    assert!(matches!(result, CommandResult::Notice(_)));
    assert_eq!(orchestrator.session().model(), GeminiModel::Flash25);
}

#[test]
fn system_shows_and_replaces_instruction() {
    let mut orchestrator = create_test_orchestrator();
    assert_eq!(
        process_input(&mut orchestrator, "/system", false),
        CommandResult::Notice("System instruction: be terse".to_string())
    );
    process_input(&mut orchestrator, "/system answer in French", false);
    assert_eq!(
        orchestrator.session().system_instruction(),
        "answer in French"
    );
}
