use std::{io, path::Path};

use thiserror::Error;

use crate::{
    application::render::{DisplayError, RenderError, TikzError},
    config::LoadError,
    infra::error::InfraError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("graphviz rendering failed: {0}")]
    Graphviz(#[from] RenderError),
    #[error("tikz rendering failed: {0}")]
    Tikz(#[from] TikzError),
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl AppError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn read(path: &Path, source: io::Error) -> Self {
        Self::io(format!("failed to read {}", path.display()), source)
    }

    pub fn write(path: &Path, source: io::Error) -> Self {
        Self::io(format!("failed to write {}", path.display()), source)
    }

    /// Text shown to the user: the sectioned diagnostic for tool failures, the message otherwise.
    pub fn report(&self) -> String {
        match self {
            AppError::Graphviz(err) => err.report(),
            AppError::Tikz(err) => err.report(),
            other => other.to_string(),
        }
    }

    /// Stable label for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Infra(_) => "telemetry",
            AppError::Graphviz(err) => err.failure.code(),
            AppError::Tikz(TikzError::Latex(err)) => err.failure.code(),
            AppError::Tikz(TikzError::Convert(err)) => err.failure.code(),
            AppError::Tikz(TikzError::SavePdf { .. }) => "save_pdf",
            AppError::Display(_) => "display",
            AppError::Io { .. } => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::types::OutputFormat,
        infra::process::{CommandLine, InvocationFailure},
    };

    fn graphviz_failure() -> AppError {
        let command = CommandLine::new("dot").arg("-Tsvg");
        let failure = InvocationFailure::Exited {
            returncode: 1,
            stderr: "Error: <stdin>: syntax error in line 1\n".to_string(),
        };
        AppError::from(RenderError::new(command, failure, "digraph {"))
    }

    #[test]
    fn tool_failures_report_sections() {
        let report = graphviz_failure().report();
        assert!(report.starts_with("[command]\ndot -Tsvg\n[returncode]\n1\n"), "{report}");
        assert!(report.contains("[stderr]\nError: <stdin>: syntax error in line 1"));
        assert!(report.ends_with("[code]\ndigraph {"));
    }

    #[test]
    fn other_failures_report_their_message() {
        let err = AppError::from(DisplayError::NotDisplayable(OutputFormat::Pdf));
        assert_eq!(err.report(), err.to_string());
        assert_eq!(err.code(), "display");

        let err = AppError::read(Path::new("cell.dot"), io::ErrorKind::NotFound.into());
        assert!(err.report().starts_with("failed to read cell.dot: "));
        assert_eq!(err.code(), "io");
    }

    #[test]
    fn codes_follow_the_invocation_failure() {
        assert_eq!(graphviz_failure().code(), "exit_status");
    }
}
