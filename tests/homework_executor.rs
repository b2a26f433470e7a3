// tests/homework_executor.rs

mod common;
use crate::common::builders::{HomeworkBuilder, TaskBuilder, TestBuilder};
use crate::common::fake_runner::{FakeRunner, Scripted};
use crate::common::{init_tracing, statuses, with_timeout};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use homework_checker::config::Homework;
use homework_checker::engine::{
    AggregateStatus, ExecutionContext, FailureReason, HomeworkExecutor, HomeworkOutcome,
    TaskExecutor, TestStatus,
};
use homework_checker::fs::mock::MockFileSystem;

fn executor(runner: &FakeRunner, fs: &MockFileSystem, max_parallel: usize) -> HomeworkExecutor {
    let fs = Arc::new(fs.clone());
    let tasks = TaskExecutor::new(Arc::new(runner.clone()), fs.clone());
    HomeworkExecutor::new(tasks, fs, max_parallel)
}

fn ctx() -> ExecutionContext {
    ExecutionContext::new("/jobs")
}

/// Everything except timings.
fn shape(outcome: &HomeworkOutcome) -> Vec<(String, AggregateStatus, Vec<TestStatus>)> {
    outcome
        .tasks
        .iter()
        .map(|t| {
            (
                t.name.clone(),
                t.status,
                t.tests.iter().map(|x| x.status.clone()).collect(),
            )
        })
        .collect()
}

fn mixed_homework() -> (Homework, MockFileSystem) {
    let fs = MockFileSystem::new();
    let mut builder = HomeworkBuilder::new("Homework 1", "homework_1");
    for i in 0..6 {
        let folder = format!("task_{i}");
        if i != 3 {
            fs.add_dir(format!("/subs/homework_1/{folder}"));
        }
        builder = builder.task(
            TaskBuilder::new(&format!("Task {i}"), &folder)
                .test(TestBuilder::new("Build", &format!("build {i}")).build())
                .test(
                    TestBuilder::new("Run", &format!("run {i}"))
                        .expect_text(&format!("out {i}"))
                        .build(),
                )
                .build(),
        );
    }
    (builder.build(), fs)
}

fn mixed_runner() -> FakeRunner {
    let mut runner = FakeRunner::new().with_delay(Duration::from_millis(20));
    for i in 0..6 {
        let stdout = if i == 4 { "wrong\n".to_string() } else { format!("out {i}\n") };
        runner = runner.on(
            &format!("run {i}"),
            Scripted::Exit { code: 0, stdout },
        );
    }
    runner.on("build 1", Scripted::exit(2))
}

#[tokio::test]
async fn missing_homework_folder_runs_no_tasks() {
    init_tracing();
    let runner = FakeRunner::new();
    let fs = MockFileSystem::new();
    fs.add_dir("/subs");
    let homework = HomeworkBuilder::new("Homework 2", "homework_2")
        .task(
            TaskBuilder::new("Task", "task")
                .test(TestBuilder::new("Build", "make").build())
                .build(),
        )
        .build();

    let outcome = executor(&runner, &fs, 1)
        .run(&homework, Path::new("/subs/homework_2"), &ctx())
        .await;

    assert_eq!(outcome.status, AggregateStatus::Error);
    assert_eq!(
        outcome.reason,
        Some(FailureReason::MissingFolder {
            path: PathBuf::from("/subs/homework_2")
        })
    );
    assert_eq!(outcome.tasks.len(), 1);
    assert_eq!(outcome.tasks[0].status, AggregateStatus::Skipped);
    assert_eq!(statuses(&outcome, "Task"), vec![TestStatus::Skipped]);
    assert!(runner.commands().is_empty());
}

#[tokio::test]
async fn failing_tasks_do_not_stop_siblings() {
    init_tracing();
    let (homework, fs) = mixed_homework();
    let runner = mixed_runner();

    let outcome = executor(&runner, &fs, 1)
        .run(&homework, Path::new("/subs/homework_1"), &ctx())
        .await;

    assert_eq!(outcome.status, AggregateStatus::Failed);
    assert_eq!(outcome.tasks.len(), 6);
    assert_eq!(outcome.task("Task 0").unwrap().status, AggregateStatus::Passed);
    assert_eq!(
        statuses(&outcome, "Task 1"),
        vec![
            TestStatus::Failed(FailureReason::NonZeroExit { code: Some(2) }),
            TestStatus::Skipped
        ]
    );
    assert_eq!(outcome.task("Task 3").unwrap().status, AggregateStatus::Error);
    assert!(matches!(
        statuses(&outcome, "Task 4")[1],
        TestStatus::Failed(FailureReason::OutputMismatch { .. })
    ));
    assert_eq!(outcome.task("Task 5").unwrap().status, AggregateStatus::Passed);
}

#[tokio::test]
async fn concurrent_run_matches_sequential_run() {
    init_tracing();
    let (homework, fs) = mixed_homework();

    let sequential = executor(&mixed_runner(), &fs, 1)
        .run(&homework, Path::new("/subs/homework_1"), &ctx())
        .await;
    let concurrent = with_timeout(
        executor(&mixed_runner(), &fs, 4).run(&homework, Path::new("/subs/homework_1"), &ctx()),
    )
    .await;

    assert_eq!(shape(&sequential), shape(&concurrent));
    assert_eq!(sequential.status, concurrent.status);
    let names: Vec<_> = concurrent.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Task 0", "Task 1", "Task 2", "Task 3", "Task 4", "Task 5"]
    );
}

#[tokio::test]
async fn expired_flag_follows_deadline() {
    init_tracing();
    let runner = FakeRunner::new();
    let fs = MockFileSystem::new();
    fs.add_dir("/subs/homework_1");
    let deadline = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let homework = HomeworkBuilder::new("Homework 1", "homework_1")
        .deadline(deadline)
        .build();
    let executor = executor(&runner, &fs, 1);

    let before = ctx().at(deadline - chrono::Duration::hours(1));
    let after = ctx().at(deadline + chrono::Duration::seconds(1));

    let on_time = executor
        .run(&homework, Path::new("/subs/homework_1"), &before)
        .await;
    let late = executor
        .run(&homework, Path::new("/subs/homework_1"), &after)
        .await;

    assert!(!on_time.expired);
    assert!(late.expired);
    assert_eq!(late.status, AggregateStatus::Passed);
}
