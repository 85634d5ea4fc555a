use crate::{
    domain::types::ConvertTarget,
    infra::process::{CommandLine, InvocationFailure},
};

use super::{
    error::ConvertError,
    invoke::{Invoker, OutputVia, WorkspaceFiles},
    to_argv,
    types::RenderResult,
};

pub const DEFAULT_PDF2SVG_COMMAND: &[&str] = &["pdf2svg"];
pub const DEFAULT_PDF2PNG_COMMAND: &[&str] = &["convert", "-density", "300"];

const SVG_FILES: WorkspaceFiles = WorkspaceFiles {
    input: "inpdf.pdf",
    output: "outsvg.svg",
    log: None,
};

const PNG_FILES: WorkspaceFiles = WorkspaceFiles {
    input: "inpdf.pdf",
    output: "outpng.png",
    log: None,
};

/// Converts LaTeX PDF output into a displayable format.
#[derive(Debug, Clone)]
pub struct PdfConverter {
    pdf2svg: Vec<String>,
    pdf2png: Vec<String>,
    invoker: Invoker,
}

impl Default for PdfConverter {
    fn default() -> Self {
        Self::new(
            to_argv(DEFAULT_PDF2SVG_COMMAND),
            to_argv(DEFAULT_PDF2PNG_COMMAND),
            Invoker::default(),
        )
    }
}

impl PdfConverter {
    pub fn new(pdf2svg: Vec<String>, pdf2png: Vec<String>, invoker: Invoker) -> Self {
        Self {
            pdf2svg,
            pdf2png,
            invoker,
        }
    }

    /// `<converter...> inpdf.pdf <output>`
    pub fn command_line(&self, target: ConvertTarget) -> CommandLine {
        let (configured, defaults, files) = self.profile(target);
        CommandLine::from_argv(configured)
            .unwrap_or_else(|| CommandLine::new(defaults[0]).args(defaults[1..].iter().copied()))
            .arg(files.input)
            .arg(files.output)
    }

    pub fn convert(&self, pdf: &[u8], target: ConvertTarget) -> Result<RenderResult, ConvertError> {
        let command = self.command_line(target);
        let (_, _, files) = self.profile(target);
        let tool = match target {
            ConvertTarget::Vector => "pdf2svg",
            ConvertTarget::Raster => "pdf2png",
        };

        let bytes = match self
            .invoker
            .invoke(tool, &command, pdf, OutputVia::Workspace(files))
        {
            Ok(bytes) => bytes,
            Err(failure) => return Err(ConvertError::new(command, failure)),
        };

        RenderResult::decode(target.output_format(), bytes)
            .map_err(|err| ConvertError::new(command, InvocationFailure::Undecodable(err)))
    }

    fn profile(
        &self,
        target: ConvertTarget,
    ) -> (&[String], &'static [&'static str], WorkspaceFiles) {
        match target {
            ConvertTarget::Vector => (self.pdf2svg.as_slice(), DEFAULT_PDF2SVG_COMMAND, SVG_FILES),
            ConvertTarget::Raster => (self.pdf2png.as_slice(), DEFAULT_PDF2PNG_COMMAND, PNG_FILES),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::application::render::types::Payload;
    use std::{fs, os::unix::fs::PermissionsExt, path::Path};
    use tempfile::TempDir;

    fn stub(dir: &Path, name: &str, body: &str) -> Vec<String> {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write stub");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("set perms");
        vec![path.display().to_string()]
    }

    #[test]
    fn default_commands_use_fixed_file_names() {
        let converter = PdfConverter::default();
        assert_eq!(
            converter.command_line(ConvertTarget::Vector).argv(),
            vec!["pdf2svg", "inpdf.pdf", "outsvg.svg"]
        );
        assert_eq!(
            converter.command_line(ConvertTarget::Raster).argv(),
            vec!["convert", "-density", "300", "inpdf.pdf", "outpng.png"]
        );
    }

    #[test]
    fn empty_configured_command_falls_back_to_default() {
        let converter = PdfConverter::new(Vec::new(), Vec::new(), Invoker::default());
        assert_eq!(
            converter.command_line(ConvertTarget::Vector).argv(),
            vec!["pdf2svg", "inpdf.pdf", "outsvg.svg"]
        );
    }

    #[test]
    fn vector_conversion_decodes_svg_text() {
        let dir = TempDir::new().expect("temp dir");
        let pdf2svg = stub(dir.path(), "fake-pdf2svg", "printf '<svg/>' > \"$2\"\n");
        let invoker = Invoker::new(Some(dir.path().join("work")));
        let converter = PdfConverter::new(pdf2svg, Vec::new(), invoker);
        let result = converter
            .convert(b"%PDF", ConvertTarget::Vector)
            .expect("svg converted");
        assert_eq!(result.payload, Payload::Text("<svg/>".to_string()));
    }

    #[test]
    fn raster_conversion_keeps_bytes() {
        let dir = TempDir::new().expect("temp dir");
        let pdf2png = stub(dir.path(), "fake-convert", "cp \"$1\" \"$2\"\n");
        let invoker = Invoker::new(Some(dir.path().join("work")));
        let converter = PdfConverter::new(Vec::new(), pdf2png, invoker);
        let result = converter
            .convert(b"\x89PNG-from-pdf", ConvertTarget::Raster)
            .expect("png converted");
        assert_eq!(result.payload, Payload::Binary(b"\x89PNG-from-pdf".to_vec()));
    }

    #[test]
    fn converter_failure_reports_real_exit_code_and_stderr() {
        let dir = TempDir::new().expect("temp dir");
        let pdf2svg = stub(
            dir.path(),
            "fake-pdf2svg",
            "echo 'Syntax Error: cannot read xref table' >&2\nexit 4\n",
        );
        let converter = PdfConverter::new(pdf2svg, Vec::new(), Invoker::default());
        let err = converter
            .convert(b"not a pdf", ConvertTarget::Vector)
            .expect_err("conversion fails");
        assert_eq!(err.returncode(), 4);
        assert!(err.stderr().contains("xref"));
        assert!(!err.report().contains("not a pdf"));
    }

    #[test]
    fn converter_without_output_file_fails() {
        let dir = TempDir::new().expect("temp dir");
        let pdf2png = stub(dir.path(), "fake-convert", "exit 0\n");
        let converter = PdfConverter::new(Vec::new(), pdf2png, Invoker::default());
        let err = converter
            .convert(b"%PDF", ConvertTarget::Raster)
            .expect_err("no png");
        assert!(err.failure.is_missing_output());
    }
}
