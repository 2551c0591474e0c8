use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

const BIN_NAME: &str = "junit-annotator";

const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites name="all">
    <testsuite name="suite" tests="2">
        <testcase name="ID(PROJ-42) my test" classname="pkg.Class" time="0.1"/>
        <testcase name="plain test" classname="pkg.Class" time="0.2">
            <failure message="boom">trace</failure>
        </testcase>
    </testsuite>
</testsuites>
"#;

const CONFIG: &str = r#"
project: PROJ
keepTestCaseIdentifier: false
testsuites_properties:
  - name: a
    value: "1"
  - name: b
    value: "2"
"#;

const EXPECTED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites name="all">
  <testsuite name="suite" tests="2">
    <testcase name="my test" classname="pkg.Class" time="0.1">
      <properties>
        <property name="polarion-testcase-id" value="PROJ-42"/>
      </properties>
    </testcase>
    <testcase name="plain test" classname="pkg.Class" time="0.2">
      <failure message="boom">trace</failure>
    </testcase>
  </testsuite>
  <properties>
    <property name="a" value="1"/>
    <property name="b" value="2"/>
    <property name="env" value="prod"/>
    <property name="region" value="us"/>
  </properties>
</testsuites>
"#;

fn write_inputs<T: AsRef<Path>>(directory: T, report: &str, config: &str) -> (PathBuf, PathBuf) {
    let report_path = directory.as_ref().join("junit.xml");
    let config_path = directory.as_ref().join("config.yaml");
    fs::write(&report_path, report).unwrap();
    fs::write(&config_path, config).unwrap();
    (report_path, config_path)
}

fn command(temp_dir: &TempDir) -> Command {
    let mut command = Command::cargo_bin(BIN_NAME).unwrap();
    command
        .current_dir(temp_dir)
        .env_remove("JUNIT_ANNOTATOR_REPORT_PATH")
        .env_remove("JUNIT_ANNOTATOR_CONFIG_FILE")
        .env_remove("JUNIT_ANNOTATOR_EXTRA_PROPERTIES");
    command
}

fn processed(temp_dir: &TempDir) -> String {
    fs::read_to_string(temp_dir.path().join("processed-junit.xml")).unwrap()
}

#[test]
fn annotate_success() {
    let temp_dir = tempdir().unwrap();
    write_inputs(&temp_dir, REPORT, CONFIG);

    let assert = command(&temp_dir)
        .args([
            "--report-path",
            "junit.xml",
            "--config-file",
            "config.yaml",
            "--extra-testsuites-properties",
            "env:prod,region:us",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Annotated 1 of 2 test cases (1 renamed)"));

    println!("{assert}");
    assert_eq!(processed(&temp_dir), EXPECTED);
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("junit.xml")).unwrap(),
        REPORT
    );
}

#[test]
fn annotate_keeps_identifier_by_default() {
    let temp_dir = tempdir().unwrap();
    write_inputs(&temp_dir, REPORT, "project: PROJ\n");

    command(&temp_dir)
        .args(["--report-path", "junit.xml", "--config-file", "config.yaml"])
        .assert()
        .success();

    let output = processed(&temp_dir);
    assert!(output.contains(r#"<testcase name="ID(PROJ-42) my test""#));
    assert!(output.contains(r#"<property name="polarion-testcase-id" value="PROJ-42"/>"#));
    assert!(output.contains("  <properties/>\n</testsuites>"));
}

#[test]
fn annotate_is_deterministic() {
    let temp_dir = tempdir().unwrap();
    write_inputs(&temp_dir, REPORT, CONFIG);
    let args = [
        "--report-path",
        "junit.xml",
        "--config-file",
        "config.yaml",
        "--extra-testsuites-properties",
        "env:prod,region:us",
    ];

    command(&temp_dir).args(args).assert().success();
    let first = fs::read(temp_dir.path().join("processed-junit.xml")).unwrap();
    command(&temp_dir).args(args).assert().success();
    let second = fs::read(temp_dir.path().join("processed-junit.xml")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn annotate_from_env() {
    let temp_dir = tempdir().unwrap();
    let (report_path, config_path) = write_inputs(&temp_dir, REPORT, CONFIG);

    command(&temp_dir)
        .env("JUNIT_ANNOTATOR_REPORT_PATH", &report_path)
        .env("JUNIT_ANNOTATOR_CONFIG_FILE", &config_path)
        .env("JUNIT_ANNOTATOR_EXTRA_PROPERTIES", "env:prod,region:us")
        .assert()
        .success();

    assert_eq!(processed(&temp_dir), EXPECTED);
}

#[test]
fn annotate_output_path_override() {
    let temp_dir = tempdir().unwrap();
    write_inputs(&temp_dir, REPORT, CONFIG);

    command(&temp_dir)
        .args([
            "--report-path",
            "junit.xml",
            "--config-file",
            "config.yaml",
            "--output-path",
            "annotated.xml",
        ])
        .assert()
        .success();

    assert!(temp_dir.path().join("annotated.xml").exists());
    assert!(!temp_dir.path().join("processed-junit.xml").exists());
}

#[test]
fn annotate_missing_report() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("config.yaml"), CONFIG).unwrap();

    let assert = command(&temp_dir)
        .args(["--report-path", "junit.xml", "--config-file", "config.yaml"])
        .assert()
        .failure()
        .code(exitcode::NOINPUT)
        .stderr(predicate::str::contains("Failed to locate xml report file"));

    println!("{assert}");
    assert!(!temp_dir.path().join("processed-junit.xml").exists());
}

#[test]
fn annotate_missing_config() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("junit.xml"), REPORT).unwrap();

    command(&temp_dir)
        .args(["--report-path", "junit.xml", "--config-file", "config.yaml"])
        .assert()
        .failure()
        .code(exitcode::NOINPUT)
        .stderr(predicate::str::contains("Failed to locate configuration file"));

    assert!(!temp_dir.path().join("processed-junit.xml").exists());
}

#[test]
fn annotate_config_without_project() {
    let temp_dir = tempdir().unwrap();
    write_inputs(&temp_dir, REPORT, "keepTestCaseIdentifier: false\n");

    command(&temp_dir)
        .args(["--report-path", "junit.xml", "--config-file", "config.yaml"])
        .assert()
        .failure()
        .code(exitcode::CONFIG)
        .stderr(predicate::str::contains(
            "project must be defined in config file",
        ));

    assert!(!temp_dir.path().join("processed-junit.xml").exists());
}

#[test]
fn annotate_invalid_extra_properties() {
    let temp_dir = tempdir().unwrap();
    write_inputs(&temp_dir, REPORT, CONFIG);

    command(&temp_dir)
        .args([
            "--report-path",
            "junit.xml",
            "--config-file",
            "config.yaml",
            "--extra-testsuites-properties",
            "env=prod",
        ])
        .assert()
        .failure()
        .code(exitcode::CONFIG)
        .stderr(predicate::str::contains("invalid extra testsuites property"));

    assert!(!temp_dir.path().join("processed-junit.xml").exists());
}

#[test]
fn annotate_malformed_report() {
    let temp_dir = tempdir().unwrap();
    write_inputs(&temp_dir, "<testsuites><testsuite></testsuites>", CONFIG);

    command(&temp_dir)
        .args(["--report-path", "junit.xml", "--config-file", "config.yaml"])
        .assert()
        .failure()
        .code(exitcode::DATAERR)
        .stderr(predicate::str::contains("Failed to parse xml report"));

    assert!(!temp_dir.path().join("processed-junit.xml").exists());
}

#[test]
fn annotate_requires_arguments() {
    let temp_dir = tempdir().unwrap();

    command(&temp_dir)
        .args(["--report-path", "junit.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--config-file <CONFIG_FILE>"));
}

#[test]
fn annotate_keeps_report_text() {
    let temp_dir = tempdir().unwrap();
    let report = concat!(
        "<testsuites>\n",
        "  <testcase name=\"ID(PROJ-7) logs\">\n",
        "    <system-out>\n    first line\n  second  </system-out>\n",
        "  </testcase>\n",
        "</testsuites>\n",
    );
    write_inputs(&temp_dir, report, "project: PROJ\n");

    command(&temp_dir)
        .args(["--report-path", "junit.xml", "--config-file", "config.yaml"])
        .assert()
        .success();

    assert!(processed(&temp_dir)
        .contains("    <system-out>\n    first line\n  second  </system-out>\n"));
}

#[test]
fn annotate_rejects_non_utf8_report() {
    let temp_dir = tempdir().unwrap();
    write_inputs(
        &temp_dir,
        "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<testsuites/>\n",
        CONFIG,
    );

    command(&temp_dir)
        .args(["--report-path", "junit.xml", "--config-file", "config.yaml"])
        .assert()
        .failure()
        .code(exitcode::DATAERR)
        .stderr(predicate::str::contains("unsupported encoding"));

    assert!(!temp_dir.path().join("processed-junit.xml").exists());
}

#[test]
fn annotate_rejects_trailing_comma_in_extra_properties() {
    let temp_dir = tempdir().unwrap();
    write_inputs(&temp_dir, REPORT, CONFIG);

    command(&temp_dir)
        .args([
            "--report-path",
            "junit.xml",
            "--config-file",
            "config.yaml",
            "--extra-testsuites-properties",
            "env:prod,",
        ])
        .assert()
        .failure()
        .code(exitcode::CONFIG);

    assert!(!temp_dir.path().join("processed-junit.xml").exists());
}
