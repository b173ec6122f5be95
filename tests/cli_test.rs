use serde_json::Value;
use std::process::{Command, Output};

/// Runs the binary with an empty environment so no project is configured
fn run_unconfigured(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_supabase-probe"))
        .args(args)
        .env_clear()
        .env("RUST_LOG", "info")
        .current_dir(std::env::temp_dir())
        .output()
        .expect("failed to run supabase-probe")
}

#[test]
fn json_report_is_the_only_thing_on_stdout() {
    let output = run_unconfigured(&["probe", "--json"]);
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout should be one JSON document");
    assert_eq!(report["sequence"], "connection");
    assert_eq!(report["completed"], false);
    assert_eq!(report["steps"][0]["kind"], "client_unavailable");

    // Log lines still appear, on stderr
    let logs = String::from_utf8_lossy(&output.stderr);
    assert!(logs.contains("Supabase client unavailable"));
    assert!(logs.contains("kind=client_unavailable"));
}

#[test]
fn debug_rpc_json_is_parseable() {
    let output = run_unconfigured(&["debug-rpc", "--json"]);
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout should be one JSON document");
    assert_eq!(report["sequence"], "procedure");
    assert_eq!(report["steps"].as_array().map(Vec::len), Some(1));
}

#[test]
fn without_json_stdout_stays_empty() {
    let output = run_unconfigured(&["probe"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}
