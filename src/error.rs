//! Error types for the signing pipeline.
//!
//! Every failure a signing call can produce is one variant of [`Error`].
//! Staging and read failures pass through as [`Error::Io`]; everything the
//! external tool does wrong is mapped onto the remaining variants by the
//! result classifier.

use std::time::Duration;

/// Result type alias for signing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while signing a PDF.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The Java runtime or the JSignPdf jar could not be found
    #[error("Unable to sign PDF. Java not installed? ({0})")]
    ToolNotInstalled(String),

    /// The Java runtime exists but may not be executed
    #[error("Unable to sign PDF. Permission denied for [{0}]")]
    PermissionDenied(String),

    /// The tool was killed because it exceeded its wall-clock budget
    #[error("Unable to sign PDF. Process killed after {0:?}. Timeout?")]
    TimedOut(Duration),

    /// The tool reported an error message of its own
    #[error("Unable to sign PDF. {0}")]
    ToolReported(String),

    /// The tool failed without a usable message; usually a wrong passphrase
    #[error("Unable to sign PDF. Incorrect password or unreadable input?")]
    AuthenticationOrInput,

    /// The tool exited normally but produced no output
    #[error("Unable to sign PDF. Result is empty")]
    EmptyResult,

    /// Signing options rejected before anything was staged
    #[error("Unable to sign PDF. Invalid option: {0}")]
    InvalidOption(String),

    /// IO error while staging inputs or reading the result
    #[error("Unable to sign PDF. IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Category of an [`Error`], for callers that branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::ToolNotInstalled`]
    ToolNotInstalled,
    /// See [`Error::PermissionDenied`]
    PermissionDenied,
    /// See [`Error::TimedOut`]
    TimedOut,
    /// See [`Error::ToolReported`]
    ToolReported,
    /// See [`Error::AuthenticationOrInput`]
    AuthenticationOrInput,
    /// See [`Error::EmptyResult`]
    EmptyResult,
    /// See [`Error::InvalidOption`]
    InvalidOption,
    /// See [`Error::Io`]
    Io,
}

impl Error {
    /// Get the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ToolNotInstalled(_) => ErrorKind::ToolNotInstalled,
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::TimedOut(_) => ErrorKind::TimedOut,
            Error::ToolReported(_) => ErrorKind::ToolReported,
            Error::AuthenticationOrInput => ErrorKind::AuthenticationOrInput,
            Error::EmptyResult => ErrorKind::EmptyResult,
            Error::InvalidOption(_) => ErrorKind::InvalidOption,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_reported_message_is_surfaced() {
        let err = Error::ToolReported("keystore password was incorrect".to_string());
        let msg = format!("{}", err);
        assert!(msg.starts_with("Unable to sign PDF"));
        assert!(msg.contains("keystore password was incorrect"));
    }

    #[test]
    fn test_timed_out_mentions_budget() {
        let err = Error::TimedOut(Duration::from_millis(250));
        let msg = format!("{}", err);
        assert!(msg.contains("250ms"));
        assert!(msg.contains("Timeout"));
    }

    #[test]
    fn test_permission_denied_names_program() {
        let err = Error::PermissionDenied("/usr/bin/java".to_string());
        assert!(format!("{}", err).contains("[/usr/bin/java]"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: Error = io.into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(format!("{}", err).contains("disk full"));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::EmptyResult.kind(), ErrorKind::EmptyResult);
        assert_eq!(Error::AuthenticationOrInput.kind(), ErrorKind::AuthenticationOrInput);
        assert_eq!(
            Error::ToolNotInstalled("java".into()).kind(),
            ErrorKind::ToolNotInstalled
        );
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
