use crate::exec::diagnose::{is_sudo_chatter, suggest_package, FailureInterpreter};
use crate::exec::FailureKind;

#[test]
fn test_incorrect_password_signature() {
    let interpreter = FailureInterpreter::new();

    let stderr = "Sorry, try again.\nsudo: 1 incorrect password attempt\n";
    assert_eq!(interpreter.diagnose(stderr, Some(1)), FailureKind::IncorrectCredential);
}

#[test]
fn test_missing_path_and_permission_signatures() {
    let interpreter = FailureInterpreter::new();

    assert_eq!(
        interpreter.diagnose("ls: cannot access '/nope': No such file or directory", Some(2)),
        FailureKind::MissingPath
    );
    assert_eq!(
        interpreter.diagnose("touch: cannot touch '/root/x': Permission denied", Some(1)),
        FailureKind::PermissionDenied
    );
}

#[test]
fn test_command_not_found_across_shells() {
    let interpreter = FailureInterpreter::new();

    let cases = [
        ("bash: line 1: htop: command not found", "htop"),
        ("zsh: command not found: htop", "htop"),
        ("fish: Unknown command: htop", "htop"),
        ("sh: 1: htop: not found", "htop"),
    ];

    for (stderr, binary) in cases {
        assert_eq!(
            interpreter.diagnose(stderr, Some(127)),
            FailureKind::CommandNotFound {
                command: Some(binary.to_string())
            },
            "stderr: {}",
            stderr
        );
    }
}

#[test]
fn test_exit_127_without_message_is_command_not_found() {
    let interpreter = FailureInterpreter::new();

    assert_eq!(
        interpreter.diagnose("", Some(127)),
        FailureKind::CommandNotFound { command: None }
    );
}

#[test]
fn test_unrecognised_failures() {
    let interpreter = FailureInterpreter::new();

    assert_eq!(interpreter.diagnose("something odd", Some(3)), FailureKind::ExitCode(3));
    assert_eq!(interpreter.diagnose("", None), FailureKind::Signal);
}

#[test]
fn test_failure_kind_display() {
    assert_eq!(FailureKind::ExitCode(2).to_string(), "failed with exit code 2");
    assert_eq!(
        FailureKind::CommandNotFound {
            command: Some("jq".into())
        }
        .to_string(),
        "command not found: jq"
    );
}

#[test]
fn test_suggest_package() {
    assert_eq!(suggest_package("pip3"), "python3-pip");
    assert_eq!(suggest_package("make"), "build-essential");
    assert_eq!(suggest_package("htop"), "htop");
}

#[test]
fn test_sudo_chatter() {
    assert!(is_sudo_chatter("[sudo] password for alice: "));
    assert!(is_sudo_chatter("Sorry, try again."));
    assert!(!is_sudo_chatter("E: Unable to locate package foo"));
    // The rejection itself stays visible for diagnosis
    assert!(!is_sudo_chatter("sudo: 3 incorrect password attempts"));
}
