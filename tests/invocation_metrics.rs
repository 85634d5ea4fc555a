#![cfg(unix)]

use std::{collections::HashSet, fs, os::unix::fs::PermissionsExt, path::Path};

use cellviz::{
    application::render::{GraphvizRenderer, Invoker, RenderRequest},
    infra::telemetry::{METRIC_INVOCATION_MS, METRIC_INVOCATIONS_TOTAL},
};
use metrics_util::debugging::DebuggingRecorder;
use tempfile::TempDir;

fn stub(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub");
    let mut perms = fs::metadata(&path).expect("stub metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub");
}

#[test]
fn invocations_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let good = TempDir::new().expect("bin dir");
    stub(good.path(), "dot", "cat");
    let renderer = GraphvizRenderer::new(Some(good.path().to_path_buf()), Invoker::default());
    renderer
        .render(&RenderRequest::new("<svg/>"))
        .expect("stub render succeeds");

    let bad = TempDir::new().expect("bin dir");
    stub(bad.path(), "dot", "cat >/dev/null\nexit 3");
    let renderer = GraphvizRenderer::new(Some(bad.path().to_path_buf()), Invoker::default());
    let err = renderer
        .render(&RenderRequest::new("digraph {"))
        .expect_err("stub render fails");
    assert_eq!(err.returncode(), 3);

    let entries = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = entries
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();
    for metric in [METRIC_INVOCATIONS_TOTAL, METRIC_INVOCATION_MS] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }

    let results: HashSet<String> = entries
        .iter()
        .filter(|(composite_key, _, _, _)| composite_key.key().name() == METRIC_INVOCATIONS_TOTAL)
        .flat_map(|(composite_key, _, _, _)| {
            composite_key
                .key()
                .labels()
                .filter(|label| label.key() == "result")
                .map(|label| label.value().to_string())
                .collect::<Vec<_>>()
        })
        .collect();
    assert!(results.contains("success"), "results: {results:?}");
    assert!(results.contains("exit_status"), "results: {results:?}");
}
