use crate::core::CommandPlan;
use crate::plan::response::{extract_json_object, parse_response, ParsedResponse};
use crate::plan::GenerationError;

#[test]
fn test_extract_first_balanced_object() {
    assert_eq!(extract_json_object(r#"{"a": {"b": 1}} {"c": 2}"#), Some(r#"{"a": {"b": 1}}"#));
    assert_eq!(extract_json_object("no json here"), None);
    assert_eq!(extract_json_object("{ unbalanced"), None);
}

#[test]
fn test_extract_ignores_braces_inside_strings() {
    let raw = r#"Here: {"commands": ["awk '{print $1}' file", "echo \"}\""]} trailing"#;
    assert_eq!(
        extract_json_object(raw),
        Some(r#"{"commands": ["awk '{print $1}' file", "echo \"}\""]}"#)
    );
}

#[test]
fn test_parse_commands_verbatim() {
    let parsed = parse_response(r#"{"commands": ["sudo apt update", "  ls  "]}"#).unwrap();
    assert_eq!(
        parsed,
        ParsedResponse::Commands(CommandPlan::new(vec![
            "sudo apt update".to_string(),
            "  ls  ".to_string()
        ]))
    );
}

#[test]
fn test_parse_with_code_fence() {
    let raw = "```json\n{\"commands\": [\"uptime\"]}\n```";
    assert_eq!(
        parse_response(raw).unwrap(),
        ParsedResponse::Commands(CommandPlan::new(vec!["uptime".to_string()]))
    );
}

#[test]
fn test_parse_declined() {
    let parsed =
        parse_response(r#"{"commands": [], "reason": "Irreversible data loss"}"#).unwrap();
    assert_eq!(parsed, ParsedResponse::Declined("Irreversible data loss".to_string()));
}

#[test]
fn test_reason_with_commands_is_not_a_refusal() {
    let parsed = parse_response(r#"{"commands": ["ls"], "reason": "note"}"#).unwrap();
    assert!(matches!(parsed, ParsedResponse::Commands(_)));
}

#[test]
fn test_missing_commands_is_empty_plan() {
    let parsed = parse_response(r#"{"something": "else"}"#).unwrap();
    assert_eq!(parsed, ParsedResponse::Commands(CommandPlan::default()));
}

#[test]
fn test_invalid_structures() {
    assert!(matches!(
        parse_response(r#"{"commands": "ls"}"#),
        Err(GenerationError::InvalidStructure(_))
    ));
    assert!(matches!(
        parse_response(r#"{"commands": ["ls", 42]}"#),
        Err(GenerationError::InvalidStructure(_))
    ));
}

#[test]
fn test_malformed_and_empty() {
    assert_eq!(parse_response("   "), Err(GenerationError::EmptyResponse));
    assert!(matches!(
        parse_response("I cannot help with that."),
        Err(GenerationError::MalformedResponse(_))
    ));
    assert!(matches!(
        parse_response(r#"{"commands": [ls]}"#),
        Err(GenerationError::MalformedResponse(_))
    ));
}

#[test]
fn test_plan_round_trips_through_json() {
    let plan = CommandPlan::new(vec![
        "echo \"quoted\"".to_string(),
        "printf '%s\\n' a b".to_string(),
        "ls | grep -v '{x}'".to_string(),
    ]);
    let json = serde_json::to_string(&plan).unwrap();

    assert_eq!(parse_response(&json).unwrap(), ParsedResponse::Commands(plan));
}
