//! Drive the excise binary end to end.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn tiny_gzip_file(dir: &TempDir) -> std::path::PathBuf {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"cli test payload\n").expect("compress");
    let data = encoder.finish().expect("finish");
    let path = dir.path().join("payload.gz");
    fs::write(&path, data).expect("write");
    path
}

#[test]
fn help_shows_usage() {
    Command::cargo_bin("excise")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Carve recognizable formats"))
        .stdout(predicate::str::contains("--extract"));
}

#[test]
fn version_is_reported() {
    Command::cargo_bin("excise")
        .expect("binary")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("excise"));
}

#[test]
fn missing_input_file_fails() {
    Command::cargo_bin("excise")
        .expect("binary")
        .arg("/nonexistent/firmware.bin")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn no_input_argument_fails() {
    Command::cargo_bin("excise")
        .expect("binary")
        .assert()
        .failure();
}

#[test]
fn verbose_scan_prints_the_result_tree() {
    let dir = TempDir::new().expect("tempdir");
    let path = tiny_gzip_file(&dir);

    Command::cargo_bin("excise")
        .expect("binary")
        .arg("-v")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("GZIP"))
        .stdout(predicate::str::contains("[0x0000]"));
}

#[test]
fn json_report_is_written() {
    let dir = TempDir::new().expect("tempdir");
    let path = tiny_gzip_file(&dir);
    let report = dir.path().join("report.json");

    Command::cargo_bin("excise")
        .expect("binary")
        .arg("-v")
        .arg("-O")
        .arg(&report)
        .arg(&path)
        .assert()
        .success();

    let contents = fs::read_to_string(&report).expect("report");
    let parsed: serde_json::Value = serde_json::from_str(&contents).expect("valid JSON");
    let nodes = parsed.as_array().expect("array");
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["type"], "GZIP");
    assert_eq!(nodes[0]["offset"], "0");
}

#[test]
fn extraction_writes_artifacts_under_the_given_path() {
    let dir = TempDir::new().expect("tempdir");
    let out = TempDir::new().expect("tempdir");
    let path = tiny_gzip_file(&dir);

    Command::cargo_bin("excise")
        .expect("binary")
        .arg("-e")
        .arg("-C")
        .arg(out.path())
        .arg(&path)
        .assert()
        .success();

    let extracted = out.path().join("payload.gz.extracted/0/decompressed.bin");
    assert_eq!(
        fs::read(&extracted).expect("extracted payload"),
        b"cli test payload\n"
    );
}
