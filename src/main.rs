use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
    process,
};

use cellviz::{
    application::{
        error::AppError,
        render::{
            DisplayArtifact, DisplayError, RenderPipeline, RenderPipelineConfig, RenderRequest,
            RenderResult, TikzRequest,
        },
    },
    config::{self, CellIo, Command, Emit, GraphvizArgs, TikzArgs},
    domain::types::{FormatKind, OutputFormat},
    infra::telemetry,
};
use tracing::{dispatcher, error, info};

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, error_code = error.code(), "application error");
    }
    eprintln!("{}", error.report());
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;
    let pipeline = RenderPipeline::new(&RenderPipelineConfig::from(&settings.render));

    match cli_args.command {
        Command::Graphviz(args) => run_graphviz(&pipeline, args),
        Command::Tikz(args) => run_tikz(&pipeline, args),
    }
}

fn run_graphviz(pipeline: &RenderPipeline, args: GraphvizArgs) -> Result<(), AppError> {
    ensure_displayable(args.format, args.io.emit)?;

    let source = read_cell(args.io.input.as_deref())?;
    let request = RenderRequest::new(source)
        .with_command(args.command)
        .with_format(args.format)
        .with_options(args.options);

    let result = pipeline.graphviz.render(&request)?;
    info!(
        target = "cellviz::graphviz",
        command = %request.command,
        format = %request.format,
        bytes = result.payload.len(),
        "graphviz cell rendered"
    );
    emit(result, &args.io)
}

fn run_tikz(pipeline: &RenderPipeline, args: TikzArgs) -> Result<(), AppError> {
    ensure_displayable(args.format.output_format(), args.io.emit)?;

    let code = read_cell(args.io.input.as_deref())?;
    let mut request = TikzRequest::new(code)
        .with_format(args.format)
        .with_options(args.options)
        .with_packages(args.packages)
        .with_libraries(args.libraries);
    if let Some(path) = args.save {
        request = request.with_save_pdf(path);
    }

    let result = pipeline.tikz.render(&request)?;
    emit(result, &args.io)
}

/// Reject a MIME bundle for document formats before any tool is launched.
fn ensure_displayable(format: OutputFormat, emit: Emit) -> Result<(), AppError> {
    if emit == Emit::MimeBundle && format.kind() == FormatKind::Document {
        return Err(DisplayError::NotDisplayable(format).into());
    }
    Ok(())
}

fn read_cell(input: Option<&Path>) -> Result<String, AppError> {
    match input {
        Some(path) => fs::read_to_string(path).map_err(|err| AppError::read(path, err)),
        None => {
            let mut cell = String::new();
            io::stdin()
                .read_to_string(&mut cell)
                .map_err(|err| AppError::io("failed to read cell from stdin", err))?;
            Ok(cell)
        }
    }
}

fn emit(result: RenderResult, io: &CellIo) -> Result<(), AppError> {
    let bytes = match io.emit {
        Emit::Raw => result.payload.into_bytes(),
        Emit::MimeBundle => {
            let artifact = DisplayArtifact::try_from(result)?;
            let mut bundle = artifact.mime_bundle().to_string().into_bytes();
            bundle.push(b'\n');
            bundle
        }
    };
    write_artifact(io.output.as_deref(), &bytes)
}

fn write_artifact(output: Option<&Path>, bytes: &[u8]) -> Result<(), AppError> {
    match output {
        Some(path) => fs::write(path, bytes).map_err(|err| AppError::write(path, err)),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .map_err(|err| AppError::io("failed to write artifact to stdout", err))
        }
    }
}
