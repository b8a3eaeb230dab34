//! Round trip against a real JSignPdf installation.
//!
//! Ignored by default. To run:
//!
//! ```text
//! JSIGNPDF_HOME=/opt/jsignpdf-2.2.0 JSIGN_FIXTURES=/path/to/fixtures \
//!     cargo test --test test_jsignpdf_roundtrip -- --ignored
//! ```
//!
//! The fixture directory holds `test.pdf`, `foo.p12` (passphrase `test1234`)
//! and `test_signed.pdf`, a reference document signed earlier with the same
//! inputs.

use jsign_oxide::{sign_pdf, ErrorKind};
use std::fs;
use std::path::PathBuf;

const PASSPHRASE: &str = "test1234";

fn fixture(name: &str) -> Vec<u8> {
    let dir = std::env::var_os("JSIGN_FIXTURES").expect("JSIGN_FIXTURES must point at the fixture directory");
    fs::read(PathBuf::from(dir).join(name)).unwrap()
}

#[test]
#[ignore = "requires Java, JSignPdf and fixture files"]
fn test_sign_fixture_document() {
    let _ = env_logger::builder().is_test(true).try_init();

    let signed = sign_pdf(&fixture("test.pdf"), &fixture("foo.p12"), Some(PASSPHRASE), None).unwrap();
    let reference = fixture("test_signed.pdf");

    assert!(!signed.is_empty());
    assert!(signed.looks_like_pdf());
    assert!(signed.has_byte_range());
    assert_eq!(signed.len(), reference.len());
}

#[test]
#[ignore = "requires Java, JSignPdf and fixture files"]
fn test_wrong_passphrase_is_an_error() {
    let err = sign_pdf(&fixture("test.pdf"), &fixture("foo.p12"), Some("wrong"), None).unwrap_err();
    assert!(
        matches!(err.kind(), ErrorKind::ToolReported | ErrorKind::AuthenticationOrInput),
        "unexpected error: {}",
        err
    );
}
