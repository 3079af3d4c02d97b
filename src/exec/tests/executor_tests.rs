use crate::core::ShellFlavor;
use crate::exec::credential::{CredentialCache, PasswordPrompt};
use crate::exec::{strip_sudo, CommandRunner, FailureKind, OutputLine, OutputSink, ShellExecutor};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;

struct NoPrompt;

impl PasswordPrompt for NoPrompt {
    fn prompt_password(&mut self, _message: &str) -> io::Result<String> {
        Err(io::Error::other("not interactive"))
    }
}

/// Sink that shares captured lines with the test
#[derive(Clone, Default)]
struct SharedSink(Rc<RefCell<Vec<OutputLine>>>);

impl OutputSink for SharedSink {
    fn line(&mut self, line: &OutputLine) {
        self.0.borrow_mut().push(line.clone());
    }
}

fn executor() -> (ShellExecutor, SharedSink) {
    let sink = SharedSink::default();
    let executor = ShellExecutor::new(
        ShellFlavor::Posix,
        CredentialCache::new(None, Box::new(NoPrompt)),
        Box::new(sink.clone()),
    );
    (executor, sink)
}

#[test]
fn test_successful_command_streams_stdout() {
    let (mut executor, sink) = executor();

    let outcome = executor.run("echo hello; echo world").unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.exit_code, Some(0));
    assert_eq!(
        *sink.0.borrow(),
        vec![
            OutputLine::Stdout("hello".to_string()),
            OutputLine::Stdout("world".to_string())
        ]
    );
}

#[test]
fn test_stderr_is_forwarded() {
    let (mut executor, sink) = executor();

    executor.run("echo oops >&2").unwrap();
    assert!(sink.0.borrow().contains(&OutputLine::Stderr("oops".to_string())));
}

#[test]
fn test_sudo_prompt_lines_are_suppressed() {
    let (mut executor, sink) = executor();

    executor
        .run("echo '[sudo] password for alice:' >&2; echo visible >&2")
        .unwrap();

    let lines = sink.0.borrow();
    assert!(lines.contains(&OutputLine::Stderr("visible".to_string())));
    assert!(lines.iter().all(|l| !matches!(l, OutputLine::Stderr(t) if t.contains("[sudo]"))));
}

#[test]
fn test_nonzero_exit_is_reported_not_raised() {
    let (mut executor, _sink) = executor();

    let outcome = executor.run("exit 3").unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.exit_code, Some(3));
    assert_eq!(outcome.failure, Some(FailureKind::ExitCode(3)));
}

#[test]
fn test_unknown_command_is_identified() {
    let (mut executor, _sink) = executor();

    let outcome = executor.run("definitely_not_a_real_binary_42").unwrap();
    assert!(!outcome.success);
    assert_eq!(
        outcome.failure,
        Some(FailureKind::CommandNotFound {
            command: Some("definitely_not_a_real_binary_42".to_string())
        })
    );
}

#[test]
fn test_missing_path_is_identified() {
    let (mut executor, _sink) = executor();

    let outcome = executor.run("ls /definitely/not/here").unwrap();
    assert_eq!(outcome.failure, Some(FailureKind::MissingPath));
}

#[test]
fn test_strip_sudo() {
    assert_eq!(strip_sudo("sudo apt update"), Some("apt update"));
    assert_eq!(strip_sudo("  sudo   ls"), Some("ls"));
    assert_eq!(strip_sudo("sudoedit /etc/hosts"), None);
    assert_eq!(strip_sudo("echo sudo"), None);
}
