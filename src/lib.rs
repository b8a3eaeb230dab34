//! # JSign Oxide
//!
//! Sign PDF documents with a PKCS#12 certificate by driving the
//! [JSignPdf](https://github.com/intoolswetrust/jsignpdf) command-line tool.
//!
//! The cryptography happens inside JSignPdf. This crate owns everything
//! around it:
//!
//! - **Staging**: inputs are written to uniquely named, owner-only files and
//!   removed again on every exit path
//! - **Invocation**: sparse [`SignOptions`] become an argument vector; absent
//!   options produce no flag at all
//! - **Execution**: the tool runs under a wall-clock timeout and is killed
//!   and reaped when it overruns
//! - **Classification**: exit status and diagnostics map onto a small
//!   [`Error`] taxonomy
//!
//! ## Quick Start
//!
//! ```ignore
//! let pdf = std::fs::read("document.pdf")?;
//! let p12 = std::fs::read("certificate.p12")?;
//!
//! let signed = jsign_oxide::sign_pdf(&pdf, &p12, Some("test1234"), None)?;
//! assert!(signed.looks_like_pdf());
//! std::fs::write("document_signed.pdf", signed.as_bytes())?;
//! ```
//!
//! The tool location comes from [`ToolConfig::from_env`]: `JSIGNPDF_HOME`
//! points at the JSignPdf installation, `JSIGNPDF_JAVA` or `JAVA_HOME` at
//! the Java runtime.
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

/// Tool location and limits
pub mod config;

// Signing pipeline
pub mod signing;

pub use config::ToolConfig;
pub use error::{Error, ErrorKind, Result};
pub use signing::{sign_pdf, PdfSigner, SignOptions, SignedDocument, SigningRequest};
