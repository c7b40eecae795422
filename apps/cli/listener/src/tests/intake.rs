// Unit tests for stdin command parsing

use crate::intake::{IntakeCommand, parse_line};

use listener_client::protocol::Command;

use serde_json::json;

/// **VALUE**: Verifies the directive words map to lifecycle operations.
#[test]
fn given_directives_when_parsed_then_lifecycle_commands() {
    assert_eq!(parse_line(":restart").unwrap(), Some(IntakeCommand::Restart));
    assert_eq!(parse_line("  :reload  ").unwrap(), Some(IntakeCommand::Reload));
    assert_eq!(parse_line(":quit\n").unwrap(), Some(IntakeCommand::Quit));
}

#[test]
fn given_blank_line_when_parsed_then_nothing() {
    assert_eq!(parse_line("").unwrap(), None);
    assert_eq!(parse_line("   \t").unwrap(), None);
}

/// **VALUE**: Verifies feed subscriptions, including names with spaces.
#[test]
fn given_subscribe_lines_when_parsed_then_send_commands() {
    assert_eq!(
        parse_line("subscribe cpu").unwrap(),
        Some(IntakeCommand::Send(Command::subscribe("cpu")))
    );
    assert_eq!(
        parse_line("unsubscribe  disk usage ").unwrap(),
        Some(IntakeCommand::Send(Command::unsubscribe("disk usage")))
    );
}

/// **VALUE**: Verifies raw JSON objects pass through unchanged.
///
/// **WHY THIS MATTERS**: Operators use this to reach server commands the binary
/// has no shorthand for.
#[test]
fn given_json_object_when_parsed_then_passthrough() {
    // GIVEN: A command object
    let line = r#"{"type":"getProcesses","limit":5}"#;

    // WHEN: Parsed
    let parsed = parse_line(line).unwrap();

    // THEN: Passed through as-is
    let expected = Command::passthrough(json!({ "type": "getProcesses", "limit": 5 })).unwrap();
    assert_eq!(parsed, Some(IntakeCommand::Send(expected)));
}

/// **VALUE**: Verifies bad input is reported rather than sent.
///
/// **BUG THIS CATCHES**: Would catch typos being forwarded to the server, or a
/// missing feed name producing an empty subscription.
#[test]
fn given_bad_input_when_parsed_then_app_error() {
    let bad = [
        ":restart now",
        ":nope",
        "subscribe",
        "unsubscribe   ",
        "hello",
        "{not json",
        r#"{"limit":5}"#,
        r#"{"type":""}"#,
    ];

    for line in bad {
        let err = parse_line(line).expect_err(line);
        assert!(err.to_string().starts_with("Listener Error:"), "{line}: {err}");
    }
}
