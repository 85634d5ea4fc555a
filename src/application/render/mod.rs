//! Rendering pipelines for Graphviz and TikZ cells.
//!
//! Every stage is a blocking function from source text or bytes to bytes, with
//! a structured error per stage. External tools do all of the actual layout
//! and typesetting work; this module only builds their command lines, feeds
//! them, and collects what they leave behind.

mod convert;
mod display;
mod document;
mod error;
mod graphviz;
mod invoke;
mod latex;
mod tikz;
mod types;

use std::path::PathBuf;

pub use convert::{DEFAULT_PDF2PNG_COMMAND, DEFAULT_PDF2SVG_COMMAND, PdfConverter};
pub use display::{DisplayArtifact, DisplayError, to_display};
pub use document::{DEFAULT_LIBRARIES, assemble, library_set, tikz_picture};
pub use error::{ConvertError, RenderError, TikzError};
pub use graphviz::GraphvizRenderer;
pub use invoke::{Invoker, NO_LOG_MARKER, OutputVia, WorkspaceFiles};
pub use latex::{DEFAULT_LATEX_COMMAND, LatexCompiler};
pub use tikz::TikzRenderer;
pub use types::{Payload, RenderRequest, RenderResult, TikzRequest};

/// Tool locations and scratch space used to build the renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPipelineConfig {
    /// Directory holding the Graphviz programs; `PATH` lookup when unset.
    pub graphviz_bin_dir: Option<PathBuf>,
    pub latex_command: Vec<String>,
    pub pdf2svg_command: Vec<String>,
    pub pdf2png_command: Vec<String>,
    /// Parent directory for per-invocation workspaces; system temp dir when unset.
    pub workspace_root: Option<PathBuf>,
}

impl Default for RenderPipelineConfig {
    fn default() -> Self {
        Self {
            graphviz_bin_dir: None,
            latex_command: to_argv(DEFAULT_LATEX_COMMAND),
            pdf2svg_command: to_argv(DEFAULT_PDF2SVG_COMMAND),
            pdf2png_command: to_argv(DEFAULT_PDF2PNG_COMMAND),
            workspace_root: None,
        }
    }
}

impl From<&crate::config::RenderSettings> for RenderPipelineConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        Self {
            graphviz_bin_dir: settings.graphviz_bin_dir.clone(),
            latex_command: settings.latex_command.clone(),
            pdf2svg_command: settings.pdf2svg_command.clone(),
            pdf2png_command: settings.pdf2png_command.clone(),
            workspace_root: settings.workspace_root.clone(),
        }
    }
}

/// Both renderers, built from one configuration.
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    pub graphviz: GraphvizRenderer,
    pub tikz: TikzRenderer,
}

impl RenderPipeline {
    pub fn new(config: &RenderPipelineConfig) -> Self {
        let invoker = Invoker::new(config.workspace_root.clone());
        let graphviz = GraphvizRenderer::new(config.graphviz_bin_dir.clone(), invoker.clone());
        let latex = LatexCompiler::new(config.latex_command.clone(), invoker.clone());
        let converter = PdfConverter::new(
            config.pdf2svg_command.clone(),
            config.pdf2png_command.clone(),
            invoker,
        );
        Self {
            graphviz,
            tikz: TikzRenderer::new(latex, converter),
        }
    }
}

pub(crate) fn to_argv(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
