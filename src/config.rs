//! Configuration for locating and driving the JSignPdf tool.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name of the bundled JSignPdf installation.
pub const JSIGNPDF_DIR: &str = "jsignpdf-2.2.0";

/// File name of the JSignPdf jar inside the installation directory.
///
/// This is the name in the upstream 2.2.0 binary distribution. Bundles that
/// spell it `JSignPDF.jar` only resolve on case-insensitive filesystems;
/// set [`ToolConfig::with_jar_name`] for those.
pub const JSIGNPDF_JAR: &str = "JSignPdf.jar";

/// Default wall-clock budget for one tool invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on captured diagnostic bytes, per stream.
pub const DEFAULT_MAX_DIAGNOSTIC_BYTES: usize = 1024 * 1024;

/// Tool configuration.
///
/// # Example
///
/// ```
/// use jsign_oxide::config::ToolConfig;
/// use std::time::Duration;
///
/// let config = ToolConfig::new()
///     .with_java("/opt/jdk/bin/java")
///     .with_default_timeout(Duration::from_secs(30));
/// assert_eq!(config.default_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Java runtime used to launch the jar.
    pub java: PathBuf,

    /// JSignPdf installation directory. Also the child's working directory.
    pub install_dir: PathBuf,

    /// Jar file name, relative to `install_dir`.
    pub jar_name: String,

    /// Directory for staged artifacts (`None` = platform temp directory).
    pub scratch_dir: Option<PathBuf>,

    /// Budget used when the request does not carry its own timeout.
    pub default_timeout: Duration,

    /// Bytes kept from each of stdout and stderr.
    pub max_diagnostic_bytes: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolConfig {
    /// Create a configuration pointing at the bundled installation.
    pub fn new() -> Self {
        Self {
            java: PathBuf::from("java"),
            install_dir: Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("lib")
                .join(JSIGNPDF_DIR),
            jar_name: JSIGNPDF_JAR.to_string(),
            scratch_dir: None,
            default_timeout: DEFAULT_TIMEOUT,
            max_diagnostic_bytes: DEFAULT_MAX_DIAGNOSTIC_BYTES,
        }
    }

    /// Create a configuration from the environment.
    ///
    /// - `JSIGNPDF_HOME` overrides the installation directory
    /// - `JSIGNPDF_JAVA` overrides the Java runtime
    /// - otherwise `JAVA_HOME` selects `$JAVA_HOME/bin/java`
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Some(home) = std::env::var_os("JSIGNPDF_HOME") {
            config.install_dir = PathBuf::from(home);
        }

        if let Some(java) = std::env::var_os("JSIGNPDF_JAVA") {
            config.java = PathBuf::from(java);
        } else if let Some(java_home) = std::env::var_os("JAVA_HOME") {
            config.java = Path::new(&java_home).join("bin").join("java");
        }

        log::debug!(
            "Tool configuration: java={}, install_dir={}",
            config.java.display(),
            config.install_dir.display()
        );
        config
    }

    /// Set the Java runtime.
    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    /// Set the JSignPdf installation directory.
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = dir.into();
        self
    }

    /// Set the jar file name.
    pub fn with_jar_name(mut self, name: impl Into<String>) -> Self {
        self.jar_name = name.into();
        self
    }

    /// Stage artifacts in `dir` instead of the platform temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Set the timeout used when a request does not specify one.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set the per-stream diagnostic capture bound.
    pub fn with_max_diagnostic_bytes(mut self, bytes: usize) -> Self {
        self.max_diagnostic_bytes = bytes;
        self
    }

    /// Full path of the jar.
    pub fn jar_path(&self) -> PathBuf {
        self.install_dir.join(&self.jar_name)
    }

    /// Directory where workspaces are staged.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Copy with every relative path anchored at the current directory.
    ///
    /// The tool runs inside `install_dir`, so any relative path it receives
    /// would otherwise resolve against that directory. A bare program name
    /// such as `java` is left alone for the `PATH` lookup.
    pub fn resolved(&self) -> io::Result<Self> {
        let cwd = std::env::current_dir()?;
        let anchor = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            }
        };

        let mut config = self.clone();
        if self.java.components().count() > 1 {
            config.java = anchor(&self.java);
        }
        config.install_dir = anchor(&self.install_dir);
        config.scratch_dir = Some(anchor(&self.scratch_dir()));
        Ok(config)
    }
}
