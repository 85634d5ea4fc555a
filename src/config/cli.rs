use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

use crate::domain::types::{GraphvizCommand, OutputFormat, TikzFormat};

/// Command-line arguments for the cellviz binary.
#[derive(Debug, Parser)]
#[command(
    name = "cellviz",
    version,
    about = "Render Graphviz and TikZ cells through their external toolchains"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "CELLVIZ_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render DOT source with one of the Graphviz layout programs.
    Graphviz(GraphvizArgs),
    /// Render a TikZ picture through pdflatex and a PDF converter.
    Tikz(TikzArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the directory that holds per-invocation scratch directories.
    #[arg(long = "workspace-root", value_name = "PATH", global = true)]
    pub workspace_root: Option<PathBuf>,
}

/// How the rendered artifact is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Emit {
    /// The artifact itself: SVG text or image/PDF bytes.
    #[default]
    Raw,
    /// A JSON object keyed by MIME type, as a notebook display would receive it.
    MimeBundle,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CellIo {
    /// Read the cell body from this file instead of stdin.
    #[arg(long = "input", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Write the artifact to this file instead of stdout.
    #[arg(long = "output", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Output representation.
    #[arg(long = "emit", value_enum, default_value_t = Emit::Raw)]
    pub emit: Emit,
}

#[derive(Debug, Args, Clone)]
pub struct GraphvizArgs {
    /// Output format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Svg)]
    pub format: OutputFormat,

    /// Graphviz layout program.
    #[arg(short = 'c', long = "command", value_enum, default_value_t = GraphvizCommand::Dot)]
    pub command: GraphvizCommand,

    /// Override the directory the Graphviz programs are run from.
    #[arg(long = "graphviz-bin-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub bin_dir: Option<PathBuf>,

    #[command(flatten)]
    pub io: CellIo,

    /// Options passed to graphviz (put them after `--`).
    #[arg(value_name = "OPTIONS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub options: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct TikzArgs {
    /// Output format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = TikzFormat::Svg)]
    pub format: TikzFormat,

    /// Additional TikZ libraries, loaded before the default set.
    #[arg(short = 'l', long = "library", value_name = "LIBRARY", num_args = 1..)]
    pub libraries: Vec<String>,

    /// Additional LaTeX packages.
    #[arg(short = 'p', long = "package", value_name = "PACKAGE", num_args = 1..)]
    pub packages: Vec<String>,

    /// Options for the tikzpicture environment. Give hyphen-led tokens as `--options=->`.
    #[arg(short = 'o', long = "options", value_name = "OPTION", num_args = 1..)]
    pub options: Vec<String>,

    /// Also keep the compiled PDF at this path.
    #[arg(long = "save", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub save: Option<PathBuf>,

    /// Override the LaTeX command line (program and flags, space separated).
    #[arg(long = "latex-command", value_name = "COMMAND")]
    pub latex_command: Option<String>,

    /// Override the PDF to SVG converter command line.
    #[arg(long = "pdf2svg-command", value_name = "COMMAND")]
    pub pdf2svg_command: Option<String>,

    /// Override the PDF to PNG converter command line.
    #[arg(long = "pdf2png-command", value_name = "COMMAND")]
    pub pdf2png_command: Option<String>,

    #[command(flatten)]
    pub io: CellIo,
}
