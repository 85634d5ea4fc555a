use std::{fs, time::Instant};

use tracing::info;

use super::{
    convert::PdfConverter,
    document::assemble,
    error::TikzError,
    latex::LatexCompiler,
    types::{Payload, RenderResult, TikzRequest},
};
use crate::domain::types::OutputFormat;

/// TikZ pipeline: assemble the document, compile it to PDF, then convert the
/// PDF to the requested format. Stages run strictly one after another.
#[derive(Debug, Clone, Default)]
pub struct TikzRenderer {
    latex: LatexCompiler,
    converter: PdfConverter,
}

impl TikzRenderer {
    pub fn new(latex: LatexCompiler, converter: PdfConverter) -> Self {
        Self { latex, converter }
    }

    pub fn document(request: &TikzRequest) -> String {
        assemble(
            &request.code,
            &request.options,
            &request.packages,
            &request.libraries,
        )
    }

    pub fn render(&self, request: &TikzRequest) -> Result<RenderResult, TikzError> {
        let started_at = Instant::now();
        let document = Self::document(request);
        let pdf = self.latex.compile(&document).map_err(TikzError::Latex)?;

        if let Some(path) = request.save_pdf.as_ref() {
            fs::write(path, &pdf).map_err(|source| TikzError::SavePdf {
                path: path.clone(),
                source,
            })?;
            info!(
                target = "application::render::tikz",
                op = "tikz::save_pdf",
                path = %path.display(),
                pdf_bytes = pdf.len(),
                "Saved intermediate PDF"
            );
        }

        let result = match request.format.convert_target() {
            Some(target) => self
                .converter
                .convert(&pdf, target)
                .map_err(TikzError::Convert)?,
            None => RenderResult {
                format: OutputFormat::Pdf,
                payload: Payload::Binary(pdf),
            },
        };

        info!(
            target = "application::render::tikz",
            op = "tikz::render",
            result = "success",
            format = %request.format,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            output_bytes = result.payload.len(),
            "TikZ picture rendered"
        );
        Ok(result)
    }
}
