//! Closed enumerations for the renderers and output formats the pipelines accept.

use std::fmt;

use clap::ValueEnum;

/// Graphviz layout programs that read DOT on stdin and write the rendering to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum GraphvizCommand {
    #[default]
    Dot,
    Neato,
    Fdp,
    Twopi,
    Circo,
}

impl GraphvizCommand {
    /// Executable name looked up on `PATH` (or inside a configured bin directory).
    pub fn program(self) -> &'static str {
        match self {
            GraphvizCommand::Dot => "dot",
            GraphvizCommand::Neato => "neato",
            GraphvizCommand::Fdp => "fdp",
            GraphvizCommand::Twopi => "twopi",
            GraphvizCommand::Circo => "circo",
        }
    }
}

impl fmt::Display for GraphvizCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// How a format is handed to the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Scalable output decoded as UTF-8 text.
    Vector,
    /// Pixel output kept as bytes.
    Raster,
    /// Printable output (PDF/PostScript), returned as bytes for saving only.
    Document,
}

/// Every format a renderer in this crate can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
    Pdf,
    Ps,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Ps => "ps",
        }
    }

    pub fn kind(self) -> FormatKind {
        match self {
            OutputFormat::Svg => FormatKind::Vector,
            OutputFormat::Png => FormatKind::Raster,
            OutputFormat::Pdf | OutputFormat::Ps => FormatKind::Document,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Svg => "image/svg+xml",
            OutputFormat::Png => "image/png",
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Ps => "application/postscript",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats the TikZ pipeline can finish in. PostScript is not offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum TikzFormat {
    #[default]
    Svg,
    Png,
    Pdf,
}

impl TikzFormat {
    pub fn output_format(self) -> OutputFormat {
        match self {
            TikzFormat::Svg => OutputFormat::Svg,
            TikzFormat::Png => OutputFormat::Png,
            TikzFormat::Pdf => OutputFormat::Pdf,
        }
    }

    /// Conversion applied to the LaTeX PDF, if any.
    pub fn convert_target(self) -> Option<ConvertTarget> {
        match self {
            TikzFormat::Svg => Some(ConvertTarget::Vector),
            TikzFormat::Png => Some(ConvertTarget::Raster),
            TikzFormat::Pdf => None,
        }
    }
}

impl fmt::Display for TikzFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.output_format().fmt(f)
    }
}

/// Target of the PDF post-conversion stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertTarget {
    Vector,
    Raster,
}

impl ConvertTarget {
    pub fn output_format(self) -> OutputFormat {
        match self {
            ConvertTarget::Vector => OutputFormat::Svg,
            ConvertTarget::Raster => OutputFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphviz_values_match_program_names() {
        for command in GraphvizCommand::value_variants() {
            let parsed =
                GraphvizCommand::from_str(command.program(), false).expect("known command");
            assert_eq!(parsed, *command);
        }
    }

    #[test]
    fn format_values_match_their_names() {
        for format in OutputFormat::value_variants() {
            assert_eq!(OutputFormat::from_str(format.as_str(), false), Ok(*format));
        }
        assert!(OutputFormat::from_str("jpeg", false).is_err());
    }

    #[test]
    fn only_svg_and_png_are_displayable_kinds() {
        assert_eq!(OutputFormat::Svg.kind(), FormatKind::Vector);
        assert_eq!(OutputFormat::Png.kind(), FormatKind::Raster);
        assert_eq!(OutputFormat::Pdf.kind(), FormatKind::Document);
        assert_eq!(OutputFormat::Ps.kind(), FormatKind::Document);
    }

    #[test]
    fn tikz_pdf_skips_conversion() {
        assert_eq!(TikzFormat::Pdf.convert_target(), None);
        assert_eq!(
            TikzFormat::Png.convert_target().map(ConvertTarget::output_format),
            Some(OutputFormat::Png)
        );
    }
}
