//! Staging area for one signing call.
//!
//! A [`Workspace`] owns three paths in the scratch directory: the staged
//! document, the staged keystore, and the output the tool is expected to
//! write next to the document. All three are removed by [`Workspace::cleanup`],
//! which also runs on drop, so no exit path leaks artifacts.

use super::types::SigningRequest;
use crate::error::Result;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Prefix of every staged artifact name.
pub const ARTIFACT_PREFIX: &str = "jsign-oxide";

/// Suffix JSignPdf appends to the input name when writing its output.
pub const OUTPUT_SUFFIX: &str = "_signed";

/// Temporary artifacts of one signing call.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    document: PathBuf,
    credential: PathBuf,
    output: PathBuf,
    cleaned: bool,
}

impl Workspace {
    /// Stage the request's document and credential in `dir`.
    ///
    /// Fails without leaving files behind if either write fails. Only files
    /// this call created are removed; an existing file is never touched.
    pub fn stage(dir: &Path, request: &SigningRequest) -> Result<Self> {
        Self::stage_as(dir, &unique_stem(), request)
    }

    fn stage_as(dir: &Path, stem: &str, request: &SigningRequest) -> Result<Self> {
        // Not armed for cleanup until both files are ours.
        let mut workspace = Self {
            dir: dir.to_path_buf(),
            document: dir.join(format!("{}.pdf", stem)),
            credential: dir.join(format!("{}.p12", stem)),
            output: dir.join(format!("{}{}.pdf", stem, OUTPUT_SUFFIX)),
            cleaned: true,
        };

        write_private(&workspace.credential, &request.credential)?;
        if let Err(e) = write_private(&workspace.document, &request.document) {
            remove_if_present(&workspace.credential);
            return Err(e.into());
        }
        workspace.cleaned = false;

        log::debug!(
            "Staged {} byte document and {} byte keystore as {}",
            request.document.len(),
            request.credential.len(),
            workspace.document.display()
        );
        Ok(workspace)
    }

    /// Directory holding the artifacts; passed to the tool as output dir.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Staged input document.
    pub fn document_path(&self) -> &Path {
        &self.document
    }

    /// Staged keystore.
    pub fn credential_path(&self) -> &Path {
        &self.credential
    }

    /// Where the tool writes the signed document.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Read the tool's output once.
    ///
    /// Returns `Ok(None)` when the output is missing or empty.
    pub fn finalize(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.output) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove all three artifacts.
    ///
    /// Missing files count as removed. Returns the paths that could not be
    /// removed; each failure is logged.
    pub fn cleanup(&mut self) -> Vec<PathBuf> {
        let mut leftovers = Vec::new();
        for path in [&self.document, &self.credential, &self.output] {
            match fs::remove_file(path) {
                Ok(()) => {},
                Err(e) if e.kind() == io::ErrorKind::NotFound => {},
                Err(e) => {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                    leftovers.push(path.clone());
                },
            }
        }
        self.cleaned = leftovers.is_empty();
        leftovers
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.cleaned {
            self.cleanup();
        }
    }
}

/// `<prefix>-<pid>-<uuid v4>`: unique across threads, processes and time.
fn unique_stem() -> String {
    format!("{}-{}-{}", ARTIFACT_PREFIX, std::process::id(), uuid::Uuid::new_v4().simple())
}

/// Write `bytes` to a new owner-only file, removing it again on failure.
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = open_new_private(path)?;
    let written = file.write_all(bytes).and_then(|()| file.sync_all());
    if written.is_err() {
        drop(file);
        remove_if_present(path);
    }
    written
}

fn remove_if_present(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {},
        Err(e) if e.kind() == io::ErrorKind::NotFound => {},
        Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

#[cfg(unix)]
fn open_new_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_new_private(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}
