// tests/job_loading.rs

mod common;
use crate::common::write_file;

use std::time::Duration;

use chrono::NaiveDate;
use homework_checker::config::{ExpectedOutput, load_and_validate};
use homework_checker::errors::CheckerError;
use homework_checker::types::OutputKind;
use tempfile::TempDir;

const YAML_JOB: &str = r#"
folder: submissions
homeworks:
  - name: Sample homework
    folder: homework_1
    submit_by: "2030-01-01 00:00:00"
    tasks:
      - name: Simple task
        folder: task_1
        tests:
          - name: Build
            cmd: c++ -o main main.cpp
            timeout: 20.0
          - name: Run
            cmd: ./main
            output_type: string
            expected_output: |
              Hello World!

              Bye
          - name: Answer
            cmd: ./main --answer
            output_type: number
            expected_output: 42
"#;

#[test]
fn yaml_job_is_loaded_and_resolved() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "job.yml", YAML_JOB);

    let job = load_and_validate(dir.path().join("job.yml")).unwrap();

    assert_eq!(job.root, dir.path().join("submissions"));
    assert_eq!(job.job_dir, dir.path());

    let homework = &job.homeworks[0];
    assert_eq!(homework.name, "Sample homework");
    assert_eq!(homework.folder, "homework_1");
    assert_eq!(
        homework.deadline,
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(0, 0, 0)
    );

    let tests = &homework.tasks[0].tests;
    assert_eq!(tests.len(), 3);
    assert_eq!(tests[0].timeout, Some(Duration::from_secs(20)));
    assert_eq!(tests[0].output_kind, None);
    assert_eq!(tests[1].output_kind, Some(OutputKind::String));
    assert_eq!(
        tests[1].expected,
        Some(ExpectedOutput::Text("Hello World!\n\nBye\n".to_string()))
    );
    assert_eq!(tests[2].expected, Some(ExpectedOutput::Number(42.0)));
    assert_eq!(tests[2].timeout, None);
}

#[test]
fn toml_job_is_loaded() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "job.toml",
        r#"
folder = "/srv/submissions"

[[homeworks]]
name = "Homework 1"
folder = "homework_1"

[[homeworks.tasks]]
name = "Task 1"
folder = "task_1"

[[homeworks.tasks.tests]]
name = "Run"
cmd = "./main"
output_type = "number"
expected_output = "3.5"
timeout = 1.5
"#,
    );

    let job = load_and_validate(dir.path().join("job.toml")).unwrap();

    assert_eq!(job.root, std::path::PathBuf::from("/srv/submissions"));
    let test = &job.homeworks[0].tasks[0].tests[0];
    assert_eq!(test.expected, Some(ExpectedOutput::Number(3.5)));
    assert_eq!(test.timeout, Some(Duration::from_secs_f64(1.5)));
}

#[test]
fn float_expected_under_string_keeps_its_decimal_point() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "job.yml",
        r#"
folder: subs
homeworks:
  - name: Homework
    folder: hw
    tasks:
      - name: Task
        folder: task
        tests:
          - name: Whole
            cmd: echo 3.0
            output_type: string
            expected_output: 3.0
          - name: Half
            cmd: echo 1.5
            output_type: string
            expected_output: 1.50
"#,
    );

    let job = load_and_validate(dir.path().join("job.yml")).unwrap();

    let tests = &job.homeworks[0].tasks[0].tests;
    assert_eq!(tests[0].expected, Some(ExpectedOutput::Text("3.0".to_string())));
    assert_eq!(tests[1].expected, Some(ExpectedOutput::Text("1.5".to_string())));
}

#[test]
fn invalid_job_is_a_schema_error() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "job.yaml",
        r#"
folder: subs
homeworks:
  - name: Homework
    folder: hw
    tasks:
      - name: Task
        folder: task
        tests:
          - name: Run
            cmd: ./main
            timeout: -1
"#,
    );

    let err = load_and_validate(dir.path().join("job.yaml")).unwrap_err();

    match err {
        CheckerError::Schema(msg) => assert!(msg.contains("test 'Run'"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_yaml_is_reported() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "job.yml", "folder: [unclosed\n");

    let err = load_and_validate(dir.path().join("job.yml")).unwrap_err();

    assert!(matches!(err, CheckerError::YamlError(_)));
}

#[test]
fn missing_job_file_is_io_error() {
    let dir = TempDir::new().unwrap();

    let err = load_and_validate(dir.path().join("absent.yml")).unwrap_err();

    assert!(matches!(err, CheckerError::IoError(_)));
}
