//! Execution of the tool with a wall-clock timeout.
//!
//! stdout and stderr are drained on helper threads while the calling thread
//! waits, so a chatty tool cannot deadlock on a full pipe. Each stream keeps
//! at most `max_diagnostic_bytes` from its head; the rest is read and
//! discarded.
//!
//! On Unix the tool leads its own process group. A timeout kills the whole
//! group, so a launcher script that forks the JVM instead of `exec`ing it
//! cannot keep the pipes open past the deadline.

use super::invocation::InvocationSpec;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Instant;
use wait_timeout::ChildExt;

/// Why the tool could not be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchFailure {
    /// Program not found
    NotFound,
    /// Program not executable by this user
    PermissionDenied,
    /// Any other spawn error
    Other(String),
}

/// How the tool run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Exited with a status code
    Exited(i32),
    /// Killed by a signal it did not expect (Unix)
    Signaled(Option<i32>),
    /// Killed by the runner after the timeout elapsed
    TimedOut,
    /// Never started
    LaunchFailed(LaunchFailure),
    /// Started, but its exit status could not be collected
    WaitFailed(String),
}

/// Everything the classifier needs to know about one run.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// How the process ended
    pub termination: Termination,
    /// stderr followed by stdout, lossily decoded
    pub diagnostics: String,
    /// Whether either stream exceeded the capture bound
    pub truncated: bool,
}

impl ProcessOutcome {
    /// Outcome of a run that never started.
    pub fn launch_failed(failure: LaunchFailure) -> Self {
        Self {
            termination: Termination::LaunchFailed(failure),
            diagnostics: String::new(),
            truncated: false,
        }
    }

    /// Whether the process exited with status 0.
    pub fn exited_normally(&self) -> bool {
        self.termination == Termination::Exited(0)
    }
}

/// Run `spec` once and report how it ended.
///
/// Never returns an error: every failure, including a failed spawn, is
/// captured in the outcome for the classifier.
pub fn run(spec: &InvocationSpec, max_diagnostic_bytes: usize) -> ProcessOutcome {
    log::debug!("Running {}", spec.redacted());

    let mut command = Command::new(&spec.program);
    command
        .args(spec.args())
        .current_dir(&spec.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    isolate_process_group(&mut command);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            log::warn!("Failed to start {}: {}", spec.program.display(), e);
            return ProcessOutcome::launch_failed(launch_failure(&e));
        },
    };

    let limit = max_diagnostic_bytes as u64;
    let stdout_reader = child.stdout.take().map(|pipe| spawn_reader(pipe, limit));
    let stderr_reader = child.stderr.take().map(|pipe| spawn_reader(pipe, limit));

    let started = Instant::now();
    let termination = match child.wait_timeout(spec.timeout) {
        Ok(Some(status)) => termination_of(status),
        Ok(None) => {
            log::warn!("Tool exceeded {:?}, killing pid {}", spec.timeout, child.id());
            kill_tree(&mut child);
            Termination::TimedOut
        },
        Err(e) => {
            log::warn!("Failed to wait for pid {}: {}", child.id(), e);
            kill_tree(&mut child);
            Termination::WaitFailed(e.to_string())
        },
    };
    log::debug!("Tool finished in {:?}: {:?}", started.elapsed(), termination);

    let (stderr, stderr_truncated) = join_reader(stderr_reader);
    let (stdout, stdout_truncated) = join_reader(stdout_reader);

    let mut diagnostics = String::from_utf8_lossy(&stderr).into_owned();
    if !stdout.is_empty() {
        if !diagnostics.is_empty() && !diagnostics.ends_with('\n') {
            diagnostics.push('\n');
        }
        diagnostics.push_str(&String::from_utf8_lossy(&stdout));
    }

    ProcessOutcome {
        termination,
        diagnostics,
        truncated: stderr_truncated || stdout_truncated,
    }
}

#[cfg(unix)]
fn isolate_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_command: &mut Command) {}

/// Kill the child and everything in its process group, then reap it.
///
/// Must run before the child is reaped: until then its pid still names the
/// group.
#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    #[allow(clippy::cast_possible_wrap)]
    let group = Pid::from_raw(child.id() as i32);
    if let Err(e) = killpg(group, Signal::SIGKILL) {
        log::debug!("killpg({}) failed: {}", group, e);
        let _ = child.kill();
    }
    // Reap so the process does not linger as a zombie.
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn launch_failure(e: &io::Error) -> LaunchFailure {
    match e.kind() {
        io::ErrorKind::NotFound => LaunchFailure::NotFound,
        io::ErrorKind::PermissionDenied => LaunchFailure::PermissionDenied,
        _ => LaunchFailure::Other(e.to_string()),
    }
}

#[cfg(unix)]
fn termination_of(status: ExitStatus) -> Termination {
    use std::os::unix::process::ExitStatusExt;
    match status.code() {
        Some(code) => Termination::Exited(code),
        None => Termination::Signaled(status.signal()),
    }
}

#[cfg(not(unix))]
fn termination_of(status: ExitStatus) -> Termination {
    match status.code() {
        Some(code) => Termination::Exited(code),
        None => Termination::Signaled(None),
    }
}

type Captured = (Vec<u8>, bool);

fn spawn_reader<R: Read + Send + 'static>(pipe: R, limit: u64) -> JoinHandle<io::Result<Captured>> {
    std::thread::spawn(move || read_bounded(pipe, limit))
}

/// Keep the first `limit` bytes and drain the rest.
fn read_bounded<R: Read>(mut reader: R, limit: u64) -> io::Result<Captured> {
    let mut buffer = Vec::new();
    (&mut reader).take(limit).read_to_end(&mut buffer)?;
    let discarded = io::copy(&mut reader, &mut io::sink())?;
    Ok((buffer, discarded > 0))
}

fn join_reader(handle: Option<JoinHandle<io::Result<Captured>>>) -> Captured {
    match handle.map(JoinHandle::join) {
        Some(Ok(Ok(captured))) => captured,
        Some(Ok(Err(e))) => {
            log::warn!("Failed to read tool output: {}", e);
            (Vec::new(), false)
        },
        Some(Err(_)) => {
            log::warn!("Tool output reader panicked");
            (Vec::new(), false)
        },
        None => (Vec::new(), false),
    }
}
