//! PDF signing through the JSignPdf command-line tool.
//!
//! One call runs a short pipeline:
//!
//! 1. [`Workspace::stage`] writes the document and keystore to uniquely
//!    named files in the scratch directory
//! 2. [`build_invocation`] turns the request into an argument vector
//! 3. [`run`] executes Java with a wall-clock timeout
//! 4. the workspace reads back the output and removes every artifact
//! 5. [`classify`] resolves the run into a [`SignedDocument`] or an error
//!
//! ## Example
//!
//! ```ignore
//! use jsign_oxide::signing::{PdfSigner, SignOptions, SigningRequest, HashAlgorithm};
//!
//! let request = SigningRequest::new(pdf_bytes, p12_bytes)
//!     .with_passphrase("test1234")
//!     .with_options(SignOptions::default()
//!         .with_reason("Approved")
//!         .with_hash_algorithm(HashAlgorithm::Sha256));
//!
//! let signed = PdfSigner::from_env().sign(&request)?;
//! std::fs::write("signed.pdf", signed.as_bytes())?;
//! ```

mod classifier;
mod invocation;
mod runner;
mod signer;
mod types;
mod workspace;

pub use classifier::{classify, tool_message};
pub use invocation::{
    build_invocation, push_options, validate_request, InvocationSpec, ToolArgs, DEFAULT_KEY_TYPE,
    PASSPHRASE_FLAG,
};
pub use runner::{run, LaunchFailure, ProcessOutcome, Termination};
pub use signer::{sign_pdf, PdfSigner};
pub use types::{
    CertificationLevel, HashAlgorithm, RenderMode, SignOptions, SignedDocument, SigningRequest,
};
pub use workspace::{Workspace, ARTIFACT_PREFIX, OUTPUT_SUFFIX};
