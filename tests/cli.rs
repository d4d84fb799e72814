//! Integration tests for the cellcalc binary.

use std::path::PathBuf;
use std::process::Command;

struct Cleanup(PathBuf);

impl Drop for Cleanup {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "cellcalc_cli_{}_{}_{:?}.csv",
        name,
        std::process::id(),
        std::thread::current().id(),
    ))
}

fn run(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_cellcalc"))
        // Tests must not depend on a user's ~/.config/cellcalc/config.toml.
        .arg("--config")
        .arg("/nonexistent/cellcalc-test-config.toml")
        .args(args)
        .output()
        .expect("Failed to execute cellcalc");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

#[test]
fn test_blank_sheet_with_edits() {
    let (stdout, _, code) = run(&[
        "--rows", "1", "--cols", "2", "--format", "values", "-s", "A1=10", "-s", "B1==A1*2",
    ]);
    assert_eq!(stdout, "10,20\n");
    assert_eq!(code, 0);
}

#[test]
fn test_table_output() {
    let (stdout, _, code) = run(&["--rows", "1", "--cols", "2", "-s", "A1=0.1", "-s", "B1==A1+0.2"]);
    assert_eq!(stdout, "|   | A | B |\n|---|---|---|\n| 1 | 0.1 | 0.3 |\n");
    assert_eq!(code, 0);
}

#[test]
fn test_load_file_and_save() {
    let input = temp_path("load_in");
    let output = temp_path("load_out");
    let _cleanup = (Cleanup(input.clone()), Cleanup(output.clone()));
    std::fs::write(&input, "5,\"a, b\"\n=A1*3,\n").unwrap();

    let (stdout, _, code) = run(&[
        input.to_str().unwrap(),
        "--format",
        "values",
        "-s",
        "B2==inc(A2)",
        "-o",
        output.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "5,\"a, b\"\n15,16\n");
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "5,\"a, b\"\n=A1*3,=inc(A2)\n"
    );
}

#[test]
fn test_strict_fails_on_error_cells() {
    let (stdout, _, code) = run(&[
        "--rows", "1", "--cols", "1", "--format", "values", "--strict", "-s", "A1==A1",
    ]);
    assert_eq!(stdout, "#CYCLE!\n");
    assert_eq!(code, 1);

    let (_, _, code) = run(&["--rows", "1", "--cols", "1", "--strict", "-s", "A1=1"]);
    assert_eq!(code, 0);
}

#[test]
fn test_out_of_bounds_edit_warns() {
    let (stdout, stderr, code) = run(&["--rows", "1", "--cols", "1", "--format", "text", "-s", "C3=1"]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "\"\"\n");
    assert!(stderr.contains("skipped C3"));
}

#[test]
fn test_malformed_file_is_an_error() {
    let input = temp_path("malformed");
    let _cleanup = Cleanup(input.clone());
    std::fs::write(&input, "1,\"unterminated\n").unwrap();

    let (stdout, stderr, code) = run(&[input.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("unterminated quoted field"));
}

#[test]
fn test_config_sets_defaults() {
    let config = temp_path("config").with_extension("toml");
    let _cleanup = Cleanup(config.clone());
    std::fs::write(&config, "rows = 2\ncols = 1\nformat = \"text\"\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_cellcalc"))
        .arg("--config")
        .arg(&config)
        .args(["-s", "A2=x"])
        .output()
        .expect("Failed to execute cellcalc");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "\"\"\nx\n");
}
