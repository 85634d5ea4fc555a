//! The renderer invocation contract shared by every pipeline stage.

use std::{path::PathBuf, time::Instant};

use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use crate::infra::{
    process::{self, CommandLine, InvocationFailure},
    telemetry::{METRIC_INVOCATION_MS, METRIC_INVOCATIONS_TOTAL},
    workspace::TempWorkspace,
};

/// Diagnostic text reported when a log-producing tool fails without a log.
pub const NO_LOG_MARKER: &str = "no log file created";

/// How a tool receives its source and hands back its artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputVia {
    /// Source on stdin, artifact on stdout.
    Pipe,
    /// Source and artifact as fixed-name files in a scratch working directory.
    Workspace(WorkspaceFiles),
}

/// Fixed file names used by a workspace-based tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceFiles {
    pub input: &'static str,
    pub output: &'static str,
    /// When set, failures report this file's contents instead of stderr.
    pub log: Option<&'static str>,
}

/// Runs external tools and turns their outcome into artifact bytes or an
/// [`InvocationFailure`]. Every workspace it creates is gone when `invoke` returns.
#[derive(Debug, Clone, Default)]
pub struct Invoker {
    workspace_root: Option<PathBuf>,
}

impl Invoker {
    pub fn new(workspace_root: Option<PathBuf>) -> Self {
        Self { workspace_root }
    }

    /// Run `command`, feeding it `input`, and return the artifact it produced.
    ///
    /// `tool` is a short label (`graphviz`, `latex`, `pdf2svg`...) for logs and metrics.
    pub fn invoke(
        &self,
        tool: &'static str,
        command: &CommandLine,
        input: &[u8],
        via: OutputVia,
    ) -> Result<Vec<u8>, InvocationFailure> {
        let started_at = Instant::now();
        let outcome = match via {
            OutputVia::Pipe => invoke_piped(command, input),
            OutputVia::Workspace(files) => self.invoke_in_workspace(command, input, files),
        };
        record_outcome(tool, command, started_at, &outcome);
        outcome
    }

    fn invoke_in_workspace(
        &self,
        command: &CommandLine,
        input: &[u8],
        files: WorkspaceFiles,
    ) -> Result<Vec<u8>, InvocationFailure> {
        let workspace = TempWorkspace::create(self.workspace_root.as_deref())
            .map_err(InvocationFailure::Workspace)?;
        let outcome = run_in_workspace(&workspace, command, input, files);
        workspace.close();
        outcome
    }
}

fn invoke_piped(command: &CommandLine, input: &[u8]) -> Result<Vec<u8>, InvocationFailure> {
    let completed = process::run_piped(command, input).map_err(InvocationFailure::Launch)?;
    if !completed.success() {
        return Err(InvocationFailure::Exited {
            returncode: completed.returncode(),
            stderr: completed.stderr_lossy(),
        });
    }
    Ok(completed.stdout)
}

fn run_in_workspace(
    workspace: &TempWorkspace,
    command: &CommandLine,
    input: &[u8],
    files: WorkspaceFiles,
) -> Result<Vec<u8>, InvocationFailure> {
    workspace
        .write(files.input, input)
        .map_err(InvocationFailure::Workspace)?;

    let completed =
        process::run_in_dir(command, workspace.path()).map_err(InvocationFailure::Launch)?;
    let returncode = completed.returncode();

    if !completed.success() {
        let stderr = match files.log {
            Some(log) => match workspace.read(log) {
                Ok(Some(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
                Ok(None) => NO_LOG_MARKER.to_string(),
                Err(err) => {
                    debug!(
                        target = "application::render::invoke",
                        command = %command,
                        log = log,
                        error = %err,
                        "Failed to read tool log"
                    );
                    NO_LOG_MARKER.to_string()
                }
            },
            None => completed.stderr_lossy(),
        };
        return Err(InvocationFailure::Exited { returncode, stderr });
    }

    match workspace.read(files.output) {
        Ok(Some(bytes)) => Ok(bytes),
        Ok(None) => Err(InvocationFailure::NoOutput { returncode }),
        Err(err) => {
            debug!(
                target = "application::render::invoke",
                command = %command,
                output = files.output,
                error = %err,
                "Tool output exists but could not be read"
            );
            Err(InvocationFailure::NoOutput { returncode })
        }
    }
}

fn record_outcome(
    tool: &'static str,
    command: &CommandLine,
    started_at: Instant,
    outcome: &Result<Vec<u8>, InvocationFailure>,
) {
    let elapsed_ms = started_at.elapsed().as_millis() as u64;
    histogram!(METRIC_INVOCATION_MS, "tool" => tool).record(elapsed_ms as f64);

    match outcome {
        Ok(bytes) => {
            counter!(METRIC_INVOCATIONS_TOTAL, "tool" => tool, "result" => "success").increment(1);
            info!(
                target = "application::render::invoke",
                op = tool,
                result = "success",
                elapsed_ms,
                command = %command,
                output_bytes = bytes.len(),
                "External tool produced output"
            );
        }
        Err(failure) => {
            counter!(METRIC_INVOCATIONS_TOTAL, "tool" => tool, "result" => failure.code())
                .increment(1);
            warn!(
                target = "application::render::invoke",
                op = tool,
                result = "error",
                elapsed_ms,
                command = %command,
                exit_code = failure.returncode(),
                error_code = failure.code(),
                stderr = %failure.stderr(),
                "External tool failed"
            );
        }
    }
}
