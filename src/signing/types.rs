//! Signing request, options and result types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Certification level of the signature (`-cl`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificationLevel {
    /// Approval signature, no certification
    NotCertified,
    /// Certified, no changes allowed
    CertifiedNoChangesAllowed,
    /// Certified, form filling allowed
    CertifiedFormFilling,
    /// Certified, form filling and annotations allowed
    CertifiedFormFillingAndAnnotations,
}

impl CertificationLevel {
    /// Get the name JSignPdf expects for this level.
    pub fn as_tool_arg(&self) -> &'static str {
        match self {
            CertificationLevel::NotCertified => "NOT_CERTIFIED",
            CertificationLevel::CertifiedNoChangesAllowed => "CERTIFIED_NO_CHANGES_ALLOWED",
            CertificationLevel::CertifiedFormFilling => "CERTIFIED_FORM_FILLING",
            CertificationLevel::CertifiedFormFillingAndAnnotations => {
                "CERTIFIED_FORM_FILLING_AND_ANNOTATIONS"
            },
        }
    }
}

/// Digest algorithm used for signing (`-ha`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA-1 (deprecated, but still common in legacy PDFs)
    #[serde(rename = "SHA1")]
    Sha1,
    /// SHA-256
    #[serde(rename = "SHA256")]
    Sha256,
    /// SHA-384
    #[serde(rename = "SHA384")]
    Sha384,
    /// SHA-512
    #[serde(rename = "SHA512")]
    Sha512,
    /// RIPEMD-160
    #[serde(rename = "RIPEMD160")]
    Ripemd160,
}

impl HashAlgorithm {
    /// Get the name JSignPdf expects for this algorithm.
    pub fn as_tool_arg(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
            HashAlgorithm::Ripemd160 => "RIPEMD160",
        }
    }
}

/// What a visible signature shows (`-rm`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenderMode {
    /// Text description only
    DescriptionOnly,
    /// Image plus description
    GraphicAndDescription,
    /// Signer name plus description
    SignameAndDescription,
}

impl RenderMode {
    /// Get the name JSignPdf expects for this mode.
    pub fn as_tool_arg(&self) -> &'static str {
        match self {
            RenderMode::DescriptionOnly => "DESCRIPTION_ONLY",
            RenderMode::GraphicAndDescription => "GRAPHIC_AND_DESCRIPTION",
            RenderMode::SignameAndDescription => "SIGNAME_AND_DESCRIPTION",
        }
    }
}

/// Options for signing a PDF.
///
/// Every field is optional. `None` means the tool decides, and no flag is
/// passed for it; boolean switches are passed only when `Some(true)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SignOptions {
    /// Reason for signing
    pub reason: Option<String>,
    /// Location where the document was signed
    pub location: Option<String>,
    /// Layer-2 text of the visible signature
    pub location2: Option<String>,
    /// Layer-4 text of the visible signature
    pub location4: Option<String>,
    /// Contact information
    pub contact: Option<String>,
    /// Append a signature instead of replacing existing ones
    pub append_signature: Option<bool>,
    /// Certification level
    pub level: Option<CertificationLevel>,
    /// Keystore format (PKCS12 when absent)
    pub key_type: Option<String>,
    /// Digest algorithm
    pub hash_algorithm: Option<HashAlgorithm>,
    /// Timestamp authority URL
    pub tsa: Option<String>,
    /// Enable CRL checking
    pub crl: Option<bool>,
    /// Enable OCSP checking
    pub ocsp: Option<bool>,
    /// OCSP responder URL override
    pub ocsp_responder: Option<String>,
    /// Render a visible signature
    pub visible: Option<bool>,
    /// Lower-left x of the visible signature
    pub llx: Option<f64>,
    /// Lower-left y of the visible signature
    pub lly: Option<f64>,
    /// Upper-right x of the visible signature
    pub urx: Option<f64>,
    /// Upper-right y of the visible signature
    pub ury: Option<f64>,
    /// Font size of the visible signature text
    pub font_size: Option<f64>,
    /// Page carrying the visible signature (1-based)
    pub page_number: Option<u32>,
    /// Content of the visible signature
    pub render_mode: Option<RenderMode>,
    /// Wall-clock budget for the tool
    #[serde(rename = "timeoutMs", with = "duration_ms")]
    pub timeout: Option<Duration>,
}

impl SignOptions {
    /// Set the reason for signing.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set the signing location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the contact information.
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    /// Set the certification level.
    pub fn with_level(mut self, level: CertificationLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the digest algorithm.
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = Some(algorithm);
        self
    }

    /// Set the keystore format.
    pub fn with_key_type(mut self, key_type: impl Into<String>) -> Self {
        self.key_type = Some(key_type.into());
        self
    }

    /// Timestamp the signature with the given TSA.
    pub fn with_tsa(mut self, url: impl Into<String>) -> Self {
        self.tsa = Some(url.into());
        self
    }

    /// Render a visible signature in the given box.
    pub fn with_visible_box(mut self, llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        self.visible = Some(true);
        self.llx = Some(llx);
        self.lly = Some(lly);
        self.urx = Some(urx);
        self.ury = Some(ury);
        self
    }

    /// Set the page carrying the visible signature.
    pub fn with_page_number(mut self, page: u32) -> Self {
        self.page_number = Some(page);
        self
    }

    /// Set the tool's wall-clock budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

/// One signing call: document, credential and how to sign.
#[derive(Clone)]
pub struct SigningRequest {
    /// PDF to sign
    pub document: Vec<u8>,
    /// PKCS#12 (or other keystore) container
    pub credential: Vec<u8>,
    /// Keystore passphrase
    pub passphrase: Option<String>,
    /// Signing options
    pub options: Option<SignOptions>,
}

impl SigningRequest {
    /// Create a request without passphrase or options.
    pub fn new(document: impl Into<Vec<u8>>, credential: impl Into<Vec<u8>>) -> Self {
        Self {
            document: document.into(),
            credential: credential.into(),
            passphrase: None,
            options: None,
        }
    }

    /// Set the keystore passphrase.
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Set the signing options.
    pub fn with_options(mut self, options: SignOptions) -> Self {
        self.options = Some(options);
        self
    }
}

impl std::fmt::Debug for SigningRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningRequest")
            .field("document", &format!("{} bytes", self.document.len()))
            .field("credential", &format!("{} bytes", self.credential.len()))
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("options", &self.options)
            .finish()
    }
}

/// A signed PDF. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedDocument(Vec<u8>);

impl SignedDocument {
    /// Wrap recovered output bytes; `None` when empty.
    pub(crate) fn from_output(bytes: Vec<u8>) -> Option<Self> {
        if bytes.is_empty() {
            None
        } else {
            Some(Self(bytes))
        }
    }

    /// Borrow the signed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the signed bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the bytes start with `%PDF-` and end with `%%EOF`.
    pub fn looks_like_pdf(&self) -> bool {
        let trimmed = trim_ascii_end(&self.0);
        self.0.starts_with(b"%PDF-") && trimmed.ends_with(b"%%EOF")
    }

    /// Whether the document carries a `/ByteRange` entry.
    pub fn has_byte_range(&self) -> bool {
        self.0.windows(b"/ByteRange".len()).any(|w| w == b"/ByteRange")
    }
}

impl AsRef<[u8]> for SignedDocument {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<SignedDocument> for Vec<u8> {
    fn from(doc: SignedDocument) -> Self {
        doc.0
    }
}

impl std::fmt::Debug for SignedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SignedDocument({} bytes)", self.0.len())
    }
}

fn trim_ascii_end(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_tool_names() {
        assert_eq!(CertificationLevel::NotCertified.as_tool_arg(), "NOT_CERTIFIED");
        assert_eq!(
            CertificationLevel::CertifiedFormFillingAndAnnotations.as_tool_arg(),
            "CERTIFIED_FORM_FILLING_AND_ANNOTATIONS"
        );
        assert_eq!(HashAlgorithm::Ripemd160.as_tool_arg(), "RIPEMD160");
        assert_eq!(RenderMode::SignameAndDescription.as_tool_arg(), "SIGNAME_AND_DESCRIPTION");
    }

    #[test]
    fn test_sign_options_default_is_empty() {
        let opts = SignOptions::default();
        assert!(opts.reason.is_none());
        assert!(opts.visible.is_none());
        assert!(opts.timeout.is_none());
    }

    #[test]
    fn test_sign_options_builder() {
        let opts = SignOptions::default()
            .with_reason("Approved")
            .with_visible_box(0.0, 0.0, 30.0, 10.0)
            .with_timeout(Duration::from_secs(3));
        assert_eq!(opts.reason.as_deref(), Some("Approved"));
        assert_eq!(opts.visible, Some(true));
        assert_eq!(opts.urx, Some(30.0));
        assert_eq!(opts.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_sign_options_from_json() {
        let json = r#"{
            "reason": "Invoice",
            "level": "CERTIFIED_FORM_FILLING",
            "hashAlgorithm": "SHA512",
            "appendSignature": true,
            "renderMode": "DESCRIPTION_ONLY",
            "pageNumber": 2,
            "timeoutMs": 1500
        }"#;
        let opts: SignOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.reason.as_deref(), Some("Invoice"));
        assert_eq!(opts.level, Some(CertificationLevel::CertifiedFormFilling));
        assert_eq!(opts.hash_algorithm, Some(HashAlgorithm::Sha512));
        assert_eq!(opts.append_signature, Some(true));
        assert_eq!(opts.render_mode, Some(RenderMode::DescriptionOnly));
        assert_eq!(opts.page_number, Some(2));
        assert_eq!(opts.timeout, Some(Duration::from_millis(1500)));
        assert!(opts.location.is_none());
    }

    #[test]
    fn test_sign_options_rejects_unknown_fields() {
        let result: std::result::Result<SignOptions, _> =
            serde_json::from_str(r#"{"reasn": "typo"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_signing_request_debug_redacts_passphrase() {
        let req = SigningRequest::new(vec![1, 2, 3], vec![4, 5]).with_passphrase("hunter2");
        let debug = format!("{:?}", req);
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("3 bytes"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_signed_document_rejects_empty() {
        assert!(SignedDocument::from_output(Vec::new()).is_none());
        assert!(SignedDocument::from_output(vec![b'x']).is_some());
    }

    #[test]
    fn test_signed_document_probes() {
        let doc = SignedDocument::from_output(
            b"%PDF-1.4\n1 0 obj <</Type/Sig/ByteRange [0 10 20 30]>> endobj\n%%EOF\n".to_vec(),
        )
        .unwrap();
        assert!(doc.looks_like_pdf());
        assert!(doc.has_byte_range());

        let not_pdf = SignedDocument::from_output(b"hello".to_vec()).unwrap();
        assert!(!not_pdf.looks_like_pdf());
        assert!(!not_pdf.has_byte_range());
    }
}
