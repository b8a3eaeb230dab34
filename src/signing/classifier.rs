//! Mapping of a finished tool run onto the error taxonomy.
//!
//! Structural failures (missing tool, permissions, timeout) are decided
//! before the tool's own text is consulted; in those cases there is no
//! meaningful text to interpret.

use super::runner::{LaunchFailure, ProcessOutcome, Termination};
use super::types::SignedDocument;
use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Message JSignPdf embeds when an IOException escapes, e.g. a wrong
    /// keystore password or an unreadable input.
    static ref RE_IO_EXCEPTION: Regex = Regex::new(r"java\.io\.IOException: (.+)").unwrap();

    /// Java launcher message when the jar is missing.
    static ref RE_MISSING_JAR: Regex = Regex::new(r"Unable to access jarfile").unwrap();
}

/// Shell convention for "command not found".
const EXIT_NOT_FOUND: i32 = 127;

/// Shell convention for "found but not executable".
const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Resolve a run into a signed document or a single typed error.
///
/// `program` names the executable in error messages; `recovered` is the
/// output read back from the workspace.
pub fn classify(
    outcome: &ProcessOutcome,
    recovered: Option<Vec<u8>>,
    program: &str,
    timeout: std::time::Duration,
) -> Result<SignedDocument> {
    let text = outcome.diagnostics.as_str();

    match &outcome.termination {
        Termination::LaunchFailed(LaunchFailure::NotFound) => {
            return Err(Error::ToolNotInstalled(program.to_string()));
        },
        Termination::Exited(EXIT_NOT_FOUND) => {
            return Err(Error::ToolNotInstalled(program.to_string()));
        },
        Termination::Exited(code) if *code != 0 && RE_MISSING_JAR.is_match(text) => {
            return Err(Error::ToolNotInstalled(first_line(text).to_string()));
        },
        _ => {},
    }

    match &outcome.termination {
        Termination::LaunchFailed(LaunchFailure::PermissionDenied)
        | Termination::Exited(EXIT_NOT_EXECUTABLE) => {
            return Err(Error::PermissionDenied(program.to_string()));
        },
        Termination::TimedOut => return Err(Error::TimedOut(timeout)),
        _ => {},
    }

    let tool_message = tool_message(text);
    if !outcome.exited_normally() || tool_message.is_some() {
        log::debug!("Tool failed ({:?}): {}", outcome.termination, first_line(text));
        return Err(match tool_message {
            Some(msg) => Error::ToolReported(msg),
            None => Error::AuthenticationOrInput,
        });
    }

    recovered
        .and_then(SignedDocument::from_output)
        .ok_or(Error::EmptyResult)
}

/// Message embedded in the first `java.io.IOException` line, if any.
pub fn tool_message(diagnostics: &str) -> Option<String> {
    RE_IO_EXCEPTION
        .captures(diagnostics)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|msg| !msg.is_empty())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn outcome(termination: Termination, diagnostics: &str) -> ProcessOutcome {
        ProcessOutcome {
            termination,
            diagnostics: diagnostics.to_string(),
            truncated: false,
        }
    }

    fn kind(outcome: &ProcessOutcome, recovered: Option<Vec<u8>>) -> ErrorKind {
        classify(outcome, recovered, "java", TIMEOUT).unwrap_err().kind()
    }

    #[test]
    fn test_success() {
        let ok = outcome(Termination::Exited(0), "INFO Finished: Signature succesfully created.");
        let doc = classify(&ok, Some(b"%PDF-1.4 ... %%EOF".to_vec()), "java", TIMEOUT).unwrap();
        assert_eq!(doc.as_bytes(), b"%PDF-1.4 ... %%EOF");
    }

    #[test]
    fn test_launch_failures() {
        let not_found = outcome(Termination::LaunchFailed(LaunchFailure::NotFound), "");
        assert_eq!(kind(&not_found, None), ErrorKind::ToolNotInstalled);

        let denied = outcome(Termination::LaunchFailed(LaunchFailure::PermissionDenied), "");
        assert_eq!(kind(&denied, None), ErrorKind::PermissionDenied);

        let other = outcome(Termination::LaunchFailed(LaunchFailure::Other("E2BIG".into())), "");
        assert_eq!(kind(&other, None), ErrorKind::AuthenticationOrInput);
    }

    #[test]
    fn test_shell_exit_codes() {
        assert_eq!(kind(&outcome(Termination::Exited(127), ""), None), ErrorKind::ToolNotInstalled);
        assert_eq!(kind(&outcome(Termination::Exited(126), ""), None), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_missing_jar() {
        let missing = outcome(
            Termination::Exited(1),
            "Error: Unable to access jarfile /opt/jsignpdf-2.2.0/JSignPdf.jar\n",
        );
        let err = classify(&missing, None, "java", TIMEOUT).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolNotInstalled);
        assert!(err.to_string().contains("JSignPdf.jar"));
    }

    #[test]
    fn test_timeout_wins_over_tool_text() {
        let timed_out = outcome(Termination::TimedOut, "java.io.IOException: partial\n");
        let err = classify(&timed_out, None, "java", Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, Error::TimedOut(d) if d == Duration::from_millis(50)));
    }

    #[test]
    fn test_tool_reported_message() {
        let failed = outcome(
            Termination::Exited(1),
            "SEVERE Error\n\
             java.io.IOException: keystore password was incorrect\n\
             \tat sun.security...\n",
        );
        let err = classify(&failed, None, "java", TIMEOUT).unwrap_err();
        assert!(matches!(&err, Error::ToolReported(m) if m == "keystore password was incorrect"));
    }

    #[test]
    fn test_tool_message_with_zero_exit_is_still_an_error() {
        let failed = outcome(
            Termination::Exited(0),
            "java.io.IOException: PDF header signature not found.\n",
        );
        let err = classify(&failed, Some(b"%PDF".to_vec()), "java", TIMEOUT).unwrap_err();
        assert!(matches!(&err, Error::ToolReported(m) if m == "PDF header signature not found."));
    }

    #[test]
    fn test_generic_failure_falls_back() {
        let exited = outcome(Termination::Exited(1), "SEVERE oops");
        assert_eq!(kind(&exited, None), ErrorKind::AuthenticationOrInput);
        let signaled = outcome(Termination::Signaled(Some(9)), "");
        assert_eq!(kind(&signaled, None), ErrorKind::AuthenticationOrInput);
    }

    #[test]
    fn test_lost_exit_status_is_a_failure() {
        let lost = outcome(Termination::WaitFailed("EINTR".into()), "");
        assert_eq!(kind(&lost, Some(b"%PDF".to_vec())), ErrorKind::AuthenticationOrInput);

        let lost = outcome(Termination::WaitFailed("EINTR".into()), "java.io.IOException: bad\n");
        assert!(matches!(
            classify(&lost, None, "java", TIMEOUT),
            Err(Error::ToolReported(m)) if m == "bad"
        ));
    }

    #[test]
    fn test_empty_result() {
        let ok = outcome(Termination::Exited(0), "");
        assert_eq!(kind(&ok, None), ErrorKind::EmptyResult);
        assert_eq!(kind(&ok, Some(Vec::new())), ErrorKind::EmptyResult);
    }

    #[test]
    fn test_tool_message_extraction() {
        let two = "x\njava.io.IOException: first\njava.io.IOException: second\n";
        assert_eq!(tool_message(two), Some("first".into()));
        assert_eq!(tool_message("java.io.IOException: \n"), None);
        assert_eq!(tool_message("java.io.FileNotFoundException: nope"), None);
    }
}
