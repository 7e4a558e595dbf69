use std::path::Path;
use std::process::{Command, Output};

fn qcos(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qcos"))
        .args(args)
        .arg("--color")
        .arg("never")
        .current_dir(dir)
        .output()
        .unwrap()
}

fn write_pair(dir: &Path) {
    std::fs::write(dir.join("old.txt"), "line1\nline2\nline3").unwrap();
    std::fs::write(dir.join("new.txt"), "line1\nlineX\nline3").unwrap();
}

#[test]
fn text_output_marks_each_line() {
    let dir = tempfile::tempdir().unwrap();
    write_pair(dir.path());

    let output = qcos(dir.path(), &["diff", "old.txt", "new.txt"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        " line1\n-line2\n+lineX\n line3\n"
    );
}

#[test]
fn unified_output_has_hunk_header() {
    let dir = tempfile::tempdir().unwrap();
    write_pair(dir.path());

    let output = qcos(dir.path(), &["diff", "old.txt", "new.txt", "--unified", "1"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("--- a/old.txt\n+++ b/new.txt\n@@ -1,3 +1,3 @@\n"));
}

#[test]
fn json_output_has_stats_and_lines() {
    let dir = tempfile::tempdir().unwrap();
    write_pair(dir.path());

    let output = qcos(dir.path(), &["diff", "old.txt", "new.txt", "--format", "json"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["stats"]["added"], 1);
    assert_eq!(value["stats"]["removed"], 1);
    assert_eq!(value["stats"]["context"], 2);
    assert_eq!(value["lines"][1]["kind"], "removed");
    assert_eq!(value["lines"][1]["text"], "line2");
    assert_eq!(value["lines"][2]["kind"], "added");
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = qcos(dir.path(), &["diff", "nope.txt", "also-nope.txt"]);
    assert!(!output.status.success());
}

#[test]
fn codebase_set_then_show_uses_store() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("App.tsx"), "export const App = () => null;").unwrap();

    let set = qcos(dir.path(), &["codebase", "set", "App.tsx", "--file", "App.tsx"]);
    assert!(set.status.success(), "{}", String::from_utf8_lossy(&set.stderr));
    assert!(dir.path().join(".qcos/store.json").exists());

    let show = qcos(dir.path(), &["codebase", "show", "App.tsx"]);
    assert!(show.status.success());
    assert_eq!(
        String::from_utf8_lossy(&show.stdout),
        "export const App = () => null;\n"
    );
}

#[test]
fn seeded_telemetry_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let args = [
        "telemetry", "--metric", "health", "--ticks", "3", "--seed", "11", "--interval", "1",
        "--format", "json",
    ];

    let first = qcos(dir.path(), &args);
    let second = qcos(dir.path(), &args);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(String::from_utf8_lossy(&first.stdout).lines().count(), 3);
}
