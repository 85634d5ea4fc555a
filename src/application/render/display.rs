//! Mapping rendered output onto display objects for the host.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{Payload, RenderResult};
use crate::domain::types::{FormatKind, OutputFormat};

/// Something the host can show inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayArtifact {
    /// Scalable vector markup.
    Svg(String),
    /// Raster image bytes, unmodified.
    Image(Vec<u8>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisplayError {
    #[error("{0} output cannot be displayed inline; save the raw bytes instead")]
    NotDisplayable(OutputFormat),
    #[error("{format} payload has the wrong representation")]
    PayloadMismatch { format: OutputFormat },
}

impl DisplayArtifact {
    pub fn mime_type(&self) -> &'static str {
        match self {
            DisplayArtifact::Svg(_) => OutputFormat::Svg.mime_type(),
            DisplayArtifact::Image(_) => OutputFormat::Png.mime_type(),
        }
    }

    /// Notebook-style MIME bundle: SVG as text, raster data base64 encoded.
    pub fn mime_bundle(&self) -> Value {
        let data = match self {
            DisplayArtifact::Svg(svg) => Value::String(svg.clone()),
            DisplayArtifact::Image(bytes) => Value::String(STANDARD.encode(bytes)),
        };
        let mut bundle = Map::new();
        bundle.insert(self.mime_type().to_string(), data);
        Value::Object(bundle)
    }
}

/// Wrap a payload in the display object matching `format`.
pub fn to_display(payload: Payload, format: OutputFormat) -> Result<DisplayArtifact, DisplayError> {
    match (format.kind(), payload) {
        (FormatKind::Vector, Payload::Text(svg)) => Ok(DisplayArtifact::Svg(svg)),
        (FormatKind::Raster, Payload::Binary(bytes)) => Ok(DisplayArtifact::Image(bytes)),
        (FormatKind::Document, _) => Err(DisplayError::NotDisplayable(format)),
        (FormatKind::Vector | FormatKind::Raster, _) => {
            Err(DisplayError::PayloadMismatch { format })
        }
    }
}

impl TryFrom<RenderResult> for DisplayArtifact {
    type Error = DisplayError;

    fn try_from(result: RenderResult) -> Result<Self, Self::Error> {
        to_display(result.payload, result.format)
    }
}
