use std::{path::PathBuf, string::FromUtf8Error};

use crate::domain::types::{FormatKind, GraphvizCommand, OutputFormat, TikzFormat};

/// One Graphviz rendering request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// DOT source captured from the cell.
    pub source: String,
    pub command: GraphvizCommand,
    /// Extra flags passed to the layout program ahead of the format flag.
    pub options: Vec<String>,
    pub format: OutputFormat,
}

impl RenderRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            command: GraphvizCommand::default(),
            options: Vec::new(),
            format: OutputFormat::default(),
        }
    }

    pub fn with_command(mut self, command: GraphvizCommand) -> Self {
        self.command = command;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// One TikZ rendering request: the picture body plus document customisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TikzRequest {
    /// Body placed inside the `tikzpicture` environment.
    pub code: String,
    /// Option tokens for `\begin{tikzpicture}[...]`, joined by spaces.
    pub options: Vec<String>,
    /// Extra LaTeX packages, loaded before `tikz`.
    pub packages: Vec<String>,
    /// Extra TikZ libraries, loaded ahead of the default set.
    pub libraries: Vec<String>,
    pub format: TikzFormat,
    /// Where to keep a copy of the intermediate PDF.
    pub save_pdf: Option<PathBuf>,
}

impl TikzRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            options: Vec::new(),
            packages: Vec::new(),
            libraries: Vec::new(),
            format: TikzFormat::default(),
            save_pdf: None,
        }
    }

    pub fn with_format(mut self, format: TikzFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_packages(mut self, packages: Vec<String>) -> Self {
        self.packages = packages;
        self
    }

    pub fn with_libraries(mut self, libraries: Vec<String>) -> Self {
        self.libraries = libraries;
        self
    }

    pub fn with_save_pdf(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_pdf = Some(path.into());
        self
    }
}

/// Rendered bytes; vector formats are carried as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Successful output of a renderer or converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub format: OutputFormat,
    pub payload: Payload,
}

impl RenderResult {
    /// Wrap raw tool output, decoding vector formats as UTF-8.
    pub fn decode(format: OutputFormat, bytes: Vec<u8>) -> Result<Self, FromUtf8Error> {
        let payload = match format.kind() {
            FormatKind::Vector => Payload::Text(String::from_utf8(bytes)?),
            FormatKind::Raster | FormatKind::Document => Payload::Binary(bytes),
        };
        Ok(Self { format, payload })
    }
}
