//! End-to-end tests against the real `forkscan` binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;

use forkscan_core::{Extrema, RunConfig, TransportKind, generate_array};
use forkscan_runtime::{Coordinator, ExecutableLauncher, WORKER_SUBCOMMAND, encode_input};
use tempfile::tempdir;

const BIN: &str = env!("CARGO_BIN_EXE_forkscan");

fn forkscan(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .env_remove("FORKSCAN_OUTPUT_DIR")
        .output()
        .expect("failed to run forkscan")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn line_value<'a>(text: &'a str, prefix: &str) -> &'a str {
    text.lines()
        .find_map(|l| l.strip_prefix(prefix))
        .unwrap_or_else(|| panic!("no '{prefix}' line in:\n{text}"))
}

fn coordinator(workers: usize, transport: TransportKind, dir: &std::path::Path) -> Coordinator {
    let config = RunConfig::new(1, 1, workers)
        .with_transport(transport)
        .with_output_dir(dir);
    Coordinator::new(config, Arc::new(ExecutableLauncher::new(BIN, [WORKER_SUBCOMMAND])))
}

#[test]
fn test_missing_arguments_print_usage() {
    let output = forkscan(&["--seed", "1", "--pnum", "2"]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("missing required option --array_size"), "{text}");
    assert!(text.contains("Usage"), "{text}");
}

#[test]
fn test_non_positive_pnum_is_rejected() {
    let output = forkscan(&["--seed", "1", "--array_size", "10", "--pnum", "0"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("pnum must be a positive number"));
}

#[test]
fn test_stray_positional_is_rejected() {
    let output = forkscan(&["--seed", "1", "--array_size", "10", "--pnum", "2", "extra"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!stdout(&output).is_empty());
}

#[test]
fn test_pipe_and_file_transports_agree() {
    let dir = tempdir().unwrap();
    let base = ["--seed", "42", "--array_size", "10000", "--pnum", "4"];

    let piped = forkscan(&base);
    assert!(piped.status.success(), "{}", stdout(&piped));

    let mut file_args = base.to_vec();
    file_args.extend(["--by_files", "--output-dir", dir.path().to_str().unwrap()]);
    let filed = forkscan(&file_args);
    assert!(filed.status.success(), "{}", stdout(&filed));

    let (piped, filed) = (stdout(&piped), stdout(&filed));
    assert_eq!(line_value(&piped, "Results received: "), "4/4");
    assert_eq!(line_value(&filed, "Results received: "), "4/4");
    assert_eq!(line_value(&piped, "Min: "), line_value(&filed, "Min: "));
    assert_eq!(line_value(&piped, "Max: "), line_value(&filed, "Max: "));
    assert_eq!(line_value(&piped, "Number of processes: "), "4");
    assert!(line_value(&piped, "Elapsed time: ").ends_with("ms"));

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_json_report_matches_sequential_scan() {
    let output = forkscan(&["--seed", "7", "--array_size", "5000", "--pnum", "3", "--json"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let expected = Extrema::of(&generate_array(7, 5000)).unwrap();
    assert_eq!(report["extrema"]["min"], expected.min);
    assert_eq!(report["extrema"]["max"], expected.max);
    assert_eq!(report["results_received"], 3);
    assert_eq!(report["total_expected"], 3);
    assert_eq!(report["timed_out"], false);
    assert_eq!(report["workers"].as_array().unwrap().len(), 3);
}

#[test]
fn test_empty_partitions_are_expected_but_not_spawned() {
    let output = forkscan(&["--seed", "1", "--array_size", "3", "--pnum", "8"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert_eq!(line_value(&text, "Results received: "), "1/8");
    assert_eq!(line_value(&text, "Number of processes: "), "1");
    let expected = Extrema::of(&generate_array(1, 3)).unwrap();
    assert_eq!(line_value(&text, "Min: "), expected.min.to_string());
    assert_eq!(line_value(&text, "Max: "), expected.max.to_string());
}

#[test]
fn test_worker_subcommand_speaks_pipe_protocol() {
    let mut child = Command::new(BIN)
        .args([WORKER_SUBCOMMAND, "--index", "0"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(&encode_input(&[8, -3, 5]))
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, Extrema::new(-3, 8).unwrap().to_le_bytes());
}

#[tokio::test]
async fn test_known_array_over_both_transports() {
    let array: Arc<[i32]> = vec![3, 1, 4, 1, 5, 9, 2, 6].into();
    for transport in [TransportKind::Pipe, TransportKind::File] {
        let dir = tempdir().unwrap();
        let report = coordinator(2, transport, dir.path())
            .run(Arc::clone(&array))
            .await
            .unwrap();

        assert_eq!(report.global_min(), Some(1), "{transport}");
        assert_eq!(report.global_max(), Some(9), "{transport}");
        assert_eq!(report.results_received, 2);
        assert_eq!(report.total_expected, 2);
        assert!(report.workers.iter().all(|w| w.reported && !w.killed));
    }
}

#[tokio::test]
async fn test_single_partition_matches_sequential_scan() {
    let dir = tempdir().unwrap();
    let array: Arc<[i32]> = generate_array(99, 1000).into();
    let report = coordinator(1, TransportKind::Pipe, dir.path())
        .run(Arc::clone(&array))
        .await
        .unwrap();

    assert_eq!(report.extrema, Extrema::of(&array));
    assert_eq!(report.results_received, 1);
}

#[tokio::test]
async fn test_more_partitions_than_elements() {
    let dir = tempdir().unwrap();
    let array: Arc<[i32]> = vec![5, -2, 7].into();
    let report = coordinator(8, TransportKind::File, dir.path())
        .run(array)
        .await
        .unwrap();

    assert_eq!(report.partitions, 8);
    assert_eq!(report.total_expected, 8);
    assert_eq!(report.dispatched, 1);
    assert_eq!(report.results_received, 1);
    assert!(report.is_partial());
    assert_eq!(report.global_min(), Some(-2));
    assert_eq!(report.global_max(), Some(7));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
