//! Translation of a signing request into a JSignPdf command line.
//!
//! The result is an argument vector, never a shell string: each value is a
//! separate token handed straight to `execve`, so quoting and injection do
//! not arise. An option that is `None` produces no token at all; JSignPdf
//! treats a missing flag differently from a flag carrying the default value.

use super::types::{SignOptions, SigningRequest};
use super::workspace::Workspace;
use crate::config::ToolConfig;
use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Keystore type used when the request does not name one.
pub const DEFAULT_KEY_TYPE: &str = "PKCS12";

/// Flag carrying the keystore passphrase; its value is redacted in logs.
pub const PASSPHRASE_FLAG: &str = "-ksp";

/// Fully resolved description of one tool run.
#[derive(Clone)]
pub struct InvocationSpec {
    /// Program to execute
    pub program: PathBuf,
    /// Launcher arguments (`-jar <jar>`)
    pub launcher_args: Vec<OsString>,
    /// JSignPdf arguments, input document last
    pub tool_args: Vec<OsString>,
    /// Working directory of the child
    pub working_dir: PathBuf,
    /// Wall-clock budget
    pub timeout: Duration,
}

impl InvocationSpec {
    /// All arguments in the order they are passed to the program.
    pub fn args(&self) -> impl Iterator<Item = &OsStr> {
        self.launcher_args
            .iter()
            .chain(self.tool_args.iter())
            .map(OsString::as_os_str)
    }

    /// Command line for logging, with the passphrase masked.
    pub fn redacted(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        let mut mask_next = false;
        for arg in self.args() {
            line.push(' ');
            if mask_next {
                line.push_str("***");
            } else {
                line.push_str(&arg.to_string_lossy());
            }
            mask_next = arg == OsStr::new(PASSPHRASE_FLAG);
        }
        line
    }
}

impl fmt::Debug for InvocationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationSpec")
            .field("command", &self.redacted())
            .field("working_dir", &self.working_dir)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Check that every value in `request` can be passed to the tool.
///
/// Runs the same checks as [`build_invocation`] without needing a staged
/// workspace, so a bad request is rejected before any file is written.
pub fn validate_request(request: &SigningRequest) -> Result<()> {
    let empty = SignOptions::default();
    let options = request.options.as_ref().unwrap_or(&empty);

    let mut args = ToolArgs::default();
    args.value("-kst", options.key_type.as_deref().unwrap_or(DEFAULT_KEY_TYPE))?;
    if let Some(pass) = &request.passphrase {
        args.value(PASSPHRASE_FLAG, pass)?;
    }
    push_options(&mut args, options)
}

/// Build the invocation for `request` staged in `workspace`.
///
/// Rejects values that cannot be passed as an argument (interior NUL) and
/// out-of-range geometry before anything is spawned.
pub fn build_invocation(
    config: &ToolConfig,
    request: &SigningRequest,
    workspace: &Workspace,
) -> Result<InvocationSpec> {
    let empty = SignOptions::default();
    let options = request.options.as_ref().unwrap_or(&empty);

    let mut args = ToolArgs::default();
    args.value("-kst", options.key_type.as_deref().unwrap_or(DEFAULT_KEY_TYPE))?;
    args.path("-d", workspace.dir().as_os_str());
    args.path("-ksf", workspace.credential_path().as_os_str());
    if let Some(pass) = &request.passphrase {
        args.value(PASSPHRASE_FLAG, pass)?;
    }

    push_options(&mut args, options)?;
    args.tokens.push(workspace.document_path().as_os_str().to_owned());

    Ok(InvocationSpec {
        program: config.java.clone(),
        launcher_args: vec![OsString::from("-jar"), config.jar_path().into_os_string()],
        tool_args: args.tokens,
        working_dir: config.install_dir.clone(),
        timeout: options.timeout.unwrap_or(config.default_timeout),
    })
}

/// Append the optional flags in their fixed order.
///
/// `key_type` and `timeout` are not flags here: the keystore type is always
/// emitted up front and the timeout only bounds the run.
pub fn push_options(args: &mut ToolArgs, options: &SignOptions) -> Result<()> {
    args.opt_value("-r", options.reason.as_deref())?;
    args.opt_value("-l", options.location.as_deref())?;
    args.opt_value("--l2-text", options.location2.as_deref())?;
    args.opt_value("--l4-text", options.location4.as_deref())?;
    args.opt_value("-c", options.contact.as_deref())?;
    args.switch("-a", options.append_signature);
    args.opt_value("-cl", options.level.map(|l| l.as_tool_arg()))?;
    args.opt_value("-ha", options.hash_algorithm.map(|h| h.as_tool_arg()))?;
    args.opt_value("-ts", options.tsa.as_deref())?;
    args.switch("--crl", options.crl);
    args.switch("--ocsp", options.ocsp);
    args.opt_value("-ocspsu", options.ocsp_responder.as_deref())?;
    args.switch("-V", options.visible);
    args.percent("-llx", "llx", options.llx)?;
    args.percent("-lly", "lly", options.lly)?;
    args.percent("-urx", "urx", options.urx)?;
    args.percent("-ury", "ury", options.ury)?;
    if let Some(size) = options.font_size {
        if !size.is_finite() || size <= 0.0 {
            return Err(Error::InvalidOption(format!("fontSize must be positive, got {}", size)));
        }
        args.number("-fs", size);
    }
    if let Some(page) = options.page_number {
        if page == 0 {
            return Err(Error::InvalidOption("pageNumber is 1-based, got 0".to_string()));
        }
        args.number("-pg", page);
    }
    args.opt_value("-rm", options.render_mode.map(|m| m.as_tool_arg()))?;
    Ok(())
}

/// Ordered tool argument tokens.
#[derive(Debug, Default, Clone)]
pub struct ToolArgs {
    tokens: Vec<OsString>,
}

impl ToolArgs {
    /// The tokens collected so far.
    pub fn tokens(&self) -> &[OsString] {
        &self.tokens
    }

    fn value(&mut self, flag: &str, value: &str) -> Result<()> {
        if value.contains('\0') {
            return Err(Error::InvalidOption(format!("value for {} contains a NUL byte", flag)));
        }
        self.tokens.push(flag.into());
        self.tokens.push(value.into());
        Ok(())
    }

    fn opt_value(&mut self, flag: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(v) => self.value(flag, v),
            None => Ok(()),
        }
    }

    fn path(&mut self, flag: &str, path: &OsStr) {
        self.tokens.push(flag.into());
        self.tokens.push(path.to_owned());
    }

    fn switch(&mut self, flag: &str, enabled: Option<bool>) {
        if enabled == Some(true) {
            self.tokens.push(flag.into());
        }
    }

    fn number(&mut self, flag: &str, value: impl fmt::Display) {
        self.tokens.push(flag.into());
        self.tokens.push(value.to_string().into());
    }

    fn percent(&mut self, flag: &str, name: &str, value: Option<f64>) -> Result<()> {
        if let Some(v) = value {
            if !(0.0..=100.0).contains(&v) {
                return Err(Error::InvalidOption(format!(
                    "{} must be within 0-100, got {}",
                    name, v
                )));
            }
            self.number(flag, v);
        }
        Ok(())
    }
}
