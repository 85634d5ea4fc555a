use super::{
    error::RenderError,
    invoke::{Invoker, OutputVia, WorkspaceFiles},
    to_argv,
};
use crate::infra::process::CommandLine;

pub const DEFAULT_LATEX_COMMAND: &[&str] =
    &["pdflatex", "-shell-escape", "-interaction=nonstopmode"];

const LATEX_FILES: WorkspaceFiles = WorkspaceFiles {
    input: "code.tex",
    output: "code.pdf",
    log: Some("code.log"),
};

/// Compiles a complete LaTeX document to PDF in a scratch directory.
#[derive(Debug, Clone)]
pub struct LatexCompiler {
    command: Vec<String>,
    invoker: Invoker,
}

impl Default for LatexCompiler {
    fn default() -> Self {
        Self::new(to_argv(DEFAULT_LATEX_COMMAND), Invoker::default())
    }
}

impl LatexCompiler {
    /// `command` is the program followed by its flags; `code.tex` is appended.
    pub fn new(command: Vec<String>, invoker: Invoker) -> Self {
        Self { command, invoker }
    }

    pub fn command_line(&self) -> CommandLine {
        let base = CommandLine::from_argv(&self.command)
            .unwrap_or_else(|| CommandLine::new(DEFAULT_LATEX_COMMAND[0]));
        base.arg(LATEX_FILES.input)
    }

    /// Compile `document`, returning the PDF bytes. On failure the error
    /// carries `code.log` (or a marker when no log was written).
    pub fn compile(&self, document: &str) -> Result<Vec<u8>, RenderError> {
        let command = self.command_line();
        let outcome = self.invoker.invoke(
            "latex",
            &command,
            document.as_bytes(),
            OutputVia::Workspace(LATEX_FILES),
        );
        outcome.map_err(|failure| RenderError::new(command, failure, document))
    }
}
