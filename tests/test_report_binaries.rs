//! End-to-end tests of the report binaries: stdout layout and exit codes

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn input_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn run_tool(bin: &str, args: &[&std::ffi::OsStr]) -> Output {
    Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch report binary")
}

#[test]
fn test_order_report_success() {
    let file = input_file(r#"[{"order_id": 1, "status": "delivered", "total_price": 12.5}]"#);
    let output = run_tool(env!("CARGO_BIN_EXE_order-report"), &[file.path().as_os_str()]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Processed 1 orders:\n"));
    assert!(stdout.contains("Order ID: 1\n"));
    assert!(stdout.contains("Total Price: 12.50\n"));
    assert!(stdout.contains("        \"delivered\": 1,\n"));
    assert!(stdout.contains("    \"total_revenue\": 12.5,\n"));
    assert!(stdout.contains("    \"average_order_value\": 12.5\n"));
    assert!(output.stderr.is_empty());
}

#[test]
fn test_missing_argument_exits_one() {
    let output = run_tool(env!("CARGO_BIN_EXE_account-report"), &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_unreadable_file_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let output = run_tool(env!("CARGO_BIN_EXE_restaurant-report"), &[missing.as_os_str()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to open file"));
}

#[test]
fn test_malformed_json_exits_one_without_partial_output() {
    let file = input_file(r#"[{"status": "paid"}, {"status": "#);
    let output = run_tool(env!("CARGO_BIN_EXE_order-report"), &[file.path().as_os_str()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Error: "));
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let file = input_file(
        r#"[{"user_id": 1, "username": "amal", "email": "amal@example.com", "date_joined": "2024-05-01"}]"#,
    );
    let bin = env!("CARGO_BIN_EXE_account-report");

    let first = run_tool(bin, &[file.path().as_os_str()]);
    let second = run_tool(bin, &[file.path().as_os_str()]);
    assert_eq!(first.status.code(), Some(0));
    assert_eq!(first.stdout, second.stdout);
}
