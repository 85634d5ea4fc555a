//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::render::{
    DEFAULT_LATEX_COMMAND, DEFAULT_PDF2PNG_COMMAND, DEFAULT_PDF2SVG_COMMAND,
};

pub use cli::{CellIo, CliArgs, Command, Emit, GlobalOverrides, GraphvizArgs, TikzArgs};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "cellviz";
const ENV_PREFIX: &str = "CELLVIZ";
const LIST_KEYS: [&str; 3] = ["latex.command", "convert.pdf2svg", "convert.pdf2png"];

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub graphviz_bin_dir: Option<PathBuf>,
    pub latex_command: Vec<String>,
    pub pdf2svg_command: Vec<String>,
    pub pdf2png_command: Vec<String>,
    pub workspace_root: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    let mut environment = Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
        .list_separator(" ");
    for key in LIST_KEYS {
        environment = environment.with_list_parse_key(key);
    }
    builder = builder.add_source(environment);

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_cli(cli);

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    graphviz: RawGraphvizSettings,
    latex: RawLatexSettings,
    convert: RawConvertSettings,
    workspace: RawWorkspaceSettings,
}

impl RawSettings {
    fn apply_cli(&mut self, cli: &CliArgs) {
        self.apply_global_overrides(&cli.overrides);
        match &cli.command {
            Command::Graphviz(args) => self.apply_graphviz_overrides(args),
            Command::Tikz(args) => self.apply_tikz_overrides(args),
        }
    }

    fn apply_global_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(root) = overrides.workspace_root.as_ref() {
            self.workspace.root = Some(root.clone());
        }
    }

    fn apply_graphviz_overrides(&mut self, args: &GraphvizArgs) {
        if let Some(dir) = args.bin_dir.as_ref() {
            self.graphviz.bin_dir = Some(dir.clone());
        }
    }

    fn apply_tikz_overrides(&mut self, args: &TikzArgs) {
        if let Some(command) = args.latex_command.as_deref() {
            self.latex.command = Some(split_command(command));
        }
        if let Some(command) = args.pdf2svg_command.as_deref() {
            self.convert.pdf2svg = Some(split_command(command));
        }
        if let Some(command) = args.pdf2png_command.as_deref() {
            self.convert.pdf2png = Some(split_command(command));
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            graphviz,
            latex,
            convert,
            workspace,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let render = build_render_settings(graphviz, latex, convert, workspace)?;

        Ok(Self { logging, render })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_render_settings(
    graphviz: RawGraphvizSettings,
    latex: RawLatexSettings,
    convert: RawConvertSettings,
    workspace: RawWorkspaceSettings,
) -> Result<RenderSettings, LoadError> {
    let graphviz_bin_dir = non_empty_path(graphviz.bin_dir, "graphviz.bin_dir")?;
    let workspace_root = non_empty_path(workspace.root, "workspace.root")?;

    let latex_command =
        command_or_default(latex.command, DEFAULT_LATEX_COMMAND, "latex.command")?;
    let pdf2svg_command =
        command_or_default(convert.pdf2svg, DEFAULT_PDF2SVG_COMMAND, "convert.pdf2svg")?;
    let pdf2png_command =
        command_or_default(convert.pdf2png, DEFAULT_PDF2PNG_COMMAND, "convert.pdf2png")?;

    Ok(RenderSettings {
        graphviz_bin_dir,
        latex_command,
        pdf2svg_command,
        pdf2png_command,
        workspace_root,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGraphvizSettings {
    bin_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLatexSettings {
    command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawConvertSettings {
    pdf2svg: Option<Vec<String>>,
    pdf2png: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawWorkspaceSettings {
    root: Option<PathBuf>,
}

fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

fn non_empty_path(path: Option<PathBuf>, key: &'static str) -> Result<Option<PathBuf>, LoadError> {
    match path {
        Some(path) if path.as_os_str().is_empty() => {
            Err(LoadError::invalid(key, "path must not be empty"))
        }
        other => Ok(other),
    }
}

fn command_or_default(
    command: Option<Vec<String>>,
    default: &[&str],
    key: &'static str,
) -> Result<Vec<String>, LoadError> {
    let Some(command) = command else {
        return Ok(default.iter().map(|part| part.to_string()).collect());
    };
    match command.first() {
        None => Err(LoadError::invalid(key, "command must not be empty")),
        Some(program) if program.trim().is_empty() => {
            Err(LoadError::invalid(key, "program must not be blank"))
        }
        Some(_) => Ok(command),
    }
}
