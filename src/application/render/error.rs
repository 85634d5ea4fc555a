use std::{borrow::Cow, io, path::PathBuf};

use thiserror::Error;

use crate::infra::process::{CommandLine, InvocationFailure};

/// Failure turning source text into an artifact (Graphviz, or the LaTeX stage of TikZ).
#[derive(Debug, Error)]
#[error("`{command}` {failure}")]
pub struct RenderError {
    pub command: CommandLine,
    pub failure: InvocationFailure,
    /// Source that was being rendered, echoed back for diagnostics.
    pub code: String,
}

impl RenderError {
    pub fn new(command: CommandLine, failure: InvocationFailure, code: impl Into<String>) -> Self {
        Self {
            command,
            failure,
            code: code.into(),
        }
    }

    pub fn returncode(&self) -> i32 {
        self.failure.returncode()
    }

    /// Captured stderr, LaTeX log, or the marker describing the failure.
    pub fn stderr(&self) -> Cow<'_, str> {
        self.failure.stderr()
    }

    /// Multi-line report with `[command]`, `[returncode]`, `[stderr]` and `[code]` sections.
    pub fn report(&self) -> String {
        let mut report = base_report(&self.command, &self.failure);
        report.push_str("\n[code]\n");
        report.push_str(self.code.trim());
        report
    }
}

/// Failure turning the LaTeX PDF into SVG or PNG. Never echoes the PDF back.
#[derive(Debug, Error)]
#[error("`{command}` {failure}")]
pub struct ConvertError {
    pub command: CommandLine,
    pub failure: InvocationFailure,
}

impl ConvertError {
    pub fn new(command: CommandLine, failure: InvocationFailure) -> Self {
        Self { command, failure }
    }

    pub fn returncode(&self) -> i32 {
        self.failure.returncode()
    }

    pub fn stderr(&self) -> Cow<'_, str> {
        self.failure.stderr()
    }

    pub fn report(&self) -> String {
        base_report(&self.command, &self.failure)
    }
}

/// Failure of one stage of the TikZ pipeline.
#[derive(Debug, Error)]
pub enum TikzError {
    #[error("LaTeX compilation failed: {0}")]
    Latex(#[source] RenderError),
    #[error("PDF conversion failed: {0}")]
    Convert(#[source] ConvertError),
    #[error("failed to save PDF to {path}: {source}")]
    SavePdf {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TikzError {
    pub fn report(&self) -> String {
        match self {
            TikzError::Latex(err) => err.report(),
            TikzError::Convert(err) => err.report(),
            TikzError::SavePdf { .. } => self.to_string(),
        }
    }
}

fn base_report(command: &CommandLine, failure: &InvocationFailure) -> String {
    [
        "[command]".to_string(),
        command.to_string(),
        "[returncode]".to_string(),
        failure.returncode().to_string(),
        "[stderr]".to_string(),
        failure.stderr().trim().to_string(),
    ]
    .join("\n")
}
