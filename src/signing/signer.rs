//! The signing pipeline: stage, build, run, recover, clean up, classify.

use super::classifier::classify;
use super::invocation::{build_invocation, validate_request};
use super::runner::run;
use super::types::{SignOptions, SignedDocument, SigningRequest};
use super::workspace::Workspace;
use crate::config::ToolConfig;
use crate::error::Result;

/// Signs PDFs by driving JSignPdf.
///
/// Holds only configuration, so one signer can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct PdfSigner {
    config: ToolConfig,
}

impl PdfSigner {
    /// Create a signer with the given tool configuration.
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Create a signer configured from the environment.
    pub fn from_env() -> Self {
        Self::new(ToolConfig::from_env())
    }

    /// Tool configuration in use.
    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Sign one document.
    ///
    /// Either returns the non-empty signed bytes or exactly one error. No
    /// staged or produced file survives the call, whichever way it ends.
    /// Invalid options are rejected before anything is written.
    pub fn sign(&self, request: &SigningRequest) -> Result<SignedDocument> {
        validate_request(request)?;
        let config = self.config.resolved()?;

        let mut workspace = Workspace::stage(&config.scratch_dir(), request)?;
        let spec = build_invocation(&config, request, &workspace)?;

        let outcome = run(&spec, config.max_diagnostic_bytes);
        if outcome.truncated {
            log::debug!(
                "Tool diagnostics truncated to {} bytes per stream",
                config.max_diagnostic_bytes
            );
        }

        let recovered = if outcome.exited_normally() {
            workspace.finalize()
        } else {
            Ok(None)
        };
        workspace.cleanup();
        let recovered = recovered?;

        // A missing install directory also fails the spawn with NotFound.
        let program = if spec.working_dir.is_dir() {
            spec.program.display().to_string()
        } else {
            spec.working_dir.display().to_string()
        };
        let result = classify(&outcome, recovered, &program, spec.timeout);
        match &result {
            Ok(doc) => log::info!(
                "Signed PDF: {} bytes in, {} bytes out",
                request.document.len(),
                doc.len()
            ),
            Err(e) => log::info!("Signing failed: {}", e),
        }
        result
    }
}

/// Sign `document` with `credential` using the environment's tool setup.
///
/// ```ignore
/// let signed = jsign_oxide::sign_pdf(&pdf, &p12, Some("test1234"), None)?;
/// std::fs::write("signed.pdf", signed.as_bytes())?;
/// ```
pub fn sign_pdf(
    document: &[u8],
    credential: &[u8],
    passphrase: Option<&str>,
    options: Option<SignOptions>,
) -> Result<SignedDocument> {
    let request = SigningRequest {
        document: document.to_vec(),
        credential: credential.to_vec(),
        passphrase: passphrase.map(str::to_string),
        options,
    };
    PdfSigner::from_env().sign(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_missing_java_is_reported_and_cleaned_up() {
        let scratch = tempdir().unwrap();
        let signer = PdfSigner::new(
            ToolConfig::new()
                .with_java(scratch.path().join("no-such-java"))
                .with_install_dir(scratch.path())
                .with_scratch_dir(scratch.path()),
        );
        let request = SigningRequest::new(b"%PDF-1.4".to_vec(), b"p12".to_vec());

        let err = signer.sign(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolNotInstalled);
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_option_spawns_nothing_and_cleans_up() {
        let scratch = tempdir().unwrap();
        let signer = PdfSigner::new(ToolConfig::new().with_scratch_dir(scratch.path()));
        let request = SigningRequest::new(b"%PDF-1.4".to_vec(), b"p12".to_vec())
            .with_options(SignOptions::default().with_page_number(0));

        let err = signer.sign(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOption);
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_request_is_rejected_before_staging() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("never-created");
        let signer = PdfSigner::new(ToolConfig::new().with_scratch_dir(&missing));

        let bad_geometry = SigningRequest::new(b"%PDF-1.4".to_vec(), b"p12".to_vec())
            .with_options(SignOptions::default().with_visible_box(0.0, 0.0, 150.0, 10.0));
        let bad_passphrase =
            SigningRequest::new(b"%PDF-1.4".to_vec(), b"p12".to_vec()).with_passphrase("a\0b");

        // Staging into a missing directory would have failed with Io.
        for request in [bad_geometry, bad_passphrase] {
            let err = signer.sign(&request).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidOption);
        }
        assert!(!missing.exists());
    }

    #[test]
    fn test_signer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PdfSigner>();
    }
}
