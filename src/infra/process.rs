//! Blocking invocation of external tools.
//!
//! Two shapes are supported: tools that stream (`stdin` in, `stdout` out) and
//! tools that need named files in a working directory. Both collect stdout and
//! stderr to completion before the exit status is looked at.

use std::{
    borrow::Cow,
    fmt,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    string::FromUtf8Error,
    thread,
};

use thiserror::Error;
use tracing::debug;

/// Return code reported when the tool never ran (spawn or workspace failure).
/// Real exit codes are never negative, so this cannot be confused with one.
pub const LAUNCH_FAILURE_RETURNCODE: i32 = -1;

/// Marker used when a tool exits successfully without its expected artifact.
pub const NO_OUTPUT_MARKER: &str = "no output created";

/// Argument vector of one external invocation, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Build from a configured `[program, flags...]` vector.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Full vector, program first.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.to_string_lossy().into_owned());
        argv.extend(self.args.iter().cloned());
        argv
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// A process that ran to completion.
#[derive(Debug)]
pub struct Completed {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Completed {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn returncode(&self) -> i32 {
        returncode(self.status)
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Exit code of a finished process; processes killed by a signal report the
/// negated signal number.
pub fn returncode(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    LAUNCH_FAILURE_RETURNCODE
}

/// Why an invocation did not yield its artifact.
#[derive(Debug, Error)]
pub enum InvocationFailure {
    #[error("failed to prepare working directory: {0}")]
    Workspace(#[source] io::Error),
    #[error("failed to launch: {0}")]
    Launch(#[source] io::Error),
    #[error("exited with status {returncode}")]
    Exited { returncode: i32, stderr: String },
    #[error("exited with status {returncode} but no output created")]
    NoOutput { returncode: i32 },
    #[error("output is not valid UTF-8: {0}")]
    Undecodable(#[source] FromUtf8Error),
}

impl InvocationFailure {
    /// Process exit code, or [`LAUNCH_FAILURE_RETURNCODE`] when the tool never ran.
    pub fn returncode(&self) -> i32 {
        match self {
            InvocationFailure::Workspace(_) | InvocationFailure::Launch(_) => {
                LAUNCH_FAILURE_RETURNCODE
            }
            InvocationFailure::Exited { returncode, .. }
            | InvocationFailure::NoOutput { returncode } => *returncode,
            InvocationFailure::Undecodable(_) => 0,
        }
    }

    /// Diagnostic text captured for this failure.
    pub fn stderr(&self) -> Cow<'_, str> {
        match self {
            InvocationFailure::Exited { stderr, .. } => Cow::Borrowed(stderr.as_str()),
            InvocationFailure::NoOutput { .. } => Cow::Borrowed(NO_OUTPUT_MARKER),
            InvocationFailure::Workspace(err) | InvocationFailure::Launch(err) => {
                Cow::Owned(err.to_string())
            }
            InvocationFailure::Undecodable(err) => Cow::Owned(err.to_string()),
        }
    }

    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            InvocationFailure::Workspace(_) | InvocationFailure::Launch(_)
        )
    }

    pub fn is_missing_output(&self) -> bool {
        matches!(self, InvocationFailure::NoOutput { .. })
    }

    /// Stable short label used in logs and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            InvocationFailure::Workspace(_) => "workspace",
            InvocationFailure::Launch(_) => "spawn",
            InvocationFailure::Exited { .. } => "exit_status",
            InvocationFailure::NoOutput { .. } => "no_output",
            InvocationFailure::Undecodable(_) => "undecodable",
        }
    }
}

/// Spawn `command`, feed `input` on stdin and collect both output streams.
///
/// Stdin is written from a helper thread while the output pipes are drained.
/// A tool that exits without reading all of its input still has its output collected.
pub fn run_piped(command: &CommandLine, input: &[u8]) -> io::Result<Completed> {
    let mut child = command
        .to_command()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        thread::spawn(move || stdin.write_all(&input))
    });

    let output = child.wait_with_output()?;

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                debug!(
                    target = "infra::process",
                    command = %command,
                    error = %err,
                    "Tool stopped reading stdin before all input was written"
                );
            }
            Err(_) => {
                debug!(
                    target = "infra::process",
                    command = %command,
                    "Stdin writer thread panicked"
                );
            }
        }
    }

    Ok(Completed {
        status: output.status,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Run `command` with `dir` as its working directory and no stdin.
pub fn run_in_dir(command: &CommandLine, dir: &Path) -> io::Result<Completed> {
    let output = command
        .to_command()
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    Ok(Completed {
        status: output.status,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}
