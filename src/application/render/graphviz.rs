use std::path::PathBuf;

use crate::infra::process::{CommandLine, InvocationFailure};

use super::{
    error::RenderError,
    invoke::{Invoker, OutputVia},
    types::{RenderRequest, RenderResult},
};

/// Renders DOT source through the Graphviz layout programs over stdin/stdout.
#[derive(Debug, Clone, Default)]
pub struct GraphvizRenderer {
    bin_dir: Option<PathBuf>,
    invoker: Invoker,
}

impl GraphvizRenderer {
    pub fn new(bin_dir: Option<PathBuf>, invoker: Invoker) -> Self {
        Self { bin_dir, invoker }
    }

    /// `<program> <options...> -T<format>`
    pub fn command_line(&self, request: &RenderRequest) -> CommandLine {
        let program = match self.bin_dir.as_ref() {
            Some(dir) => dir.join(request.command.program()),
            None => PathBuf::from(request.command.program()),
        };
        CommandLine::new(program)
            .args(request.options.iter().cloned())
            .arg(format!("-T{}", request.format))
    }

    pub fn render(&self, request: &RenderRequest) -> Result<RenderResult, RenderError> {
        let command = self.command_line(request);
        let bytes = match self.invoker.invoke(
            "graphviz",
            &command,
            request.source.as_bytes(),
            OutputVia::Pipe,
        ) {
            Ok(bytes) => bytes,
            Err(failure) => return Err(RenderError::new(command, failure, &request.source)),
        };

        RenderResult::decode(request.format, bytes).map_err(|err| {
            RenderError::new(
                command,
                InvocationFailure::Undecodable(err),
                &request.source,
            )
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::{
        application::render::types::Payload,
        domain::types::{GraphvizCommand, OutputFormat},
    };
    use std::{fs, os::unix::fs::PermissionsExt, path::Path};
    use tempfile::TempDir;

    fn install_stub(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write stub");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("set perms");
    }

    fn renderer(dir: &Path) -> GraphvizRenderer {
        GraphvizRenderer::new(Some(dir.to_path_buf()), Invoker::default())
    }

    #[test]
    fn command_line_places_format_flag_last() {
        let renderer = GraphvizRenderer::default();
        let request = RenderRequest::new("graph {}")
            .with_command(GraphvizCommand::Circo)
            .with_format(OutputFormat::Png)
            .with_options(["-Gdpi=150"]);
        assert_eq!(
            renderer.command_line(&request).argv(),
            vec!["circo", "-Gdpi=150", "-Tpng"]
        );
    }

    #[test]
    fn renders_svg_from_stdout() {
        let dir = TempDir::new().expect("temp dir");
        let args_path = dir.path().join("args.log");
        let stdin_path = dir.path().join("stdin.log");
        install_stub(
            dir.path(),
            "dot",
            &format!(
                "echo \"$@\" > \"{}\"\ncat > \"{}\"\nprintf '<svg>ok</svg>'\n",
                args_path.display(),
                stdin_path.display()
            ),
        );

        let result = renderer(dir.path())
            .render(&RenderRequest::new("digraph { a -> b; }"))
            .expect("svg rendered");

        assert_eq!(result.format, OutputFormat::Svg);
        assert_eq!(result.payload, Payload::Text("<svg>ok</svg>".to_string()));
        assert_eq!(
            fs::read_to_string(&args_path).expect("args").trim(),
            "-Tsvg"
        );
        assert_eq!(
            fs::read_to_string(&stdin_path).expect("stdin"),
            "digraph { a -> b; }"
        );
    }

    #[test]
    fn non_zero_exit_carries_returncode_and_source() {
        let dir = TempDir::new().expect("temp dir");
        install_stub(
            dir.path(),
            "fdp",
            "cat >/dev/null\necho 'syntax error in line 1' >&2\nexit 42\n",
        );
        let source = "graph { a -- \n";

        let err = renderer(dir.path())
            .render(&RenderRequest::new(source).with_command(GraphvizCommand::Fdp))
            .expect_err("render fails");

        assert_eq!(err.returncode(), 42);
        assert_eq!(err.code, source);
        assert!(err.stderr().contains("syntax error in line 1"));
        assert!(!err.failure.is_launch_failure());
    }

    #[test]
    fn missing_program_is_a_launch_failure() {
        let dir = TempDir::new().expect("temp dir");
        let err = renderer(dir.path())
            .render(&RenderRequest::new("digraph {}").with_command(GraphvizCommand::Twopi))
            .expect_err("twopi is not installed in the stub dir");
        assert!(err.failure.is_launch_failure());
        assert_eq!(err.returncode(), -1);
        assert_eq!(err.code, "digraph {}");
    }

    #[test]
    fn binary_formats_are_returned_verbatim() {
        let dir = TempDir::new().expect("temp dir");
        install_stub(dir.path(), "dot", "cat >/dev/null\nprintf '%%!PS-Adobe-3.0'\n");
        let result = renderer(dir.path())
            .render(&RenderRequest::new("digraph {}").with_format(OutputFormat::Ps))
            .expect("ps rendered");
        assert_eq!(result.payload, Payload::Binary(b"%!PS-Adobe-3.0".to_vec()));
    }
}
