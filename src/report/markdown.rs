// src/report/markdown.rs

//! Markdown report: one table row per test, details for everything that
//! did not pass.

use std::fmt::Write;

use crate::engine::{FailureReason, HomeworkOutcome, JobOutcome, TaskOutcome, TestOutcome, TestStatus};

const PASSED: &str = "✅";
const FAILED: &str = "❌";
const SKIPPED: &str = "⏭";
const ERROR: &str = "⚠";

const EXPIRED_NOTE: &str =
    "The deadline for this homework has passed. Results are shown for information only.";

pub fn render(outcome: &JobOutcome) -> String {
    let mut out = String::new();
    let summary = outcome.summary();

    out.push_str("# Test results\n\n");
    out.push_str("| Homework Name | Task Name | Test Name | Result |\n");
    out.push_str("|---|---|---|---|\n");
    for homework in &outcome.homeworks {
        table_rows(&mut out, homework);
    }

    let _ = writeln!(
        out,
        "\n**{} passed, {} failed, {} skipped, {} errors** in {:.2}s",
        summary.passed,
        summary.failed,
        summary.skipped,
        summary.errors + summary.task_errors + summary.homework_errors,
        outcome.elapsed.as_secs_f64()
    );

    for homework in &outcome.homeworks {
        details(&mut out, homework);
    }

    out
}

fn table_rows(out: &mut String, homework: &HomeworkOutcome) {
    if let Some(reason) = &homework.reason {
        let _ = writeln!(
            out,
            "| {} | | | {ERROR} {} |",
            cell(&homework.name),
            cell(&reason.to_string())
        );
    }

    for task in &homework.tasks {
        if let Some(reason) = &task.reason {
            let _ = writeln!(
                out,
                "| {} | {} | | {ERROR} {} |",
                cell(&homework.name),
                cell(&task.name),
                cell(&reason.to_string())
            );
        }
        for test in &task.tests {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                cell(&homework.name),
                cell(&task.name),
                cell(&test.name),
                symbol(&test.status)
            );
        }
    }
}

fn details(out: &mut String, homework: &HomeworkOutcome) {
    let failing: Vec<(&TaskOutcome, &TestOutcome)> = homework
        .tasks
        .iter()
        .flat_map(|task| task.tests.iter().map(move |test| (task, test)))
        .filter(|(_, test)| test.status.reason().is_some())
        .collect();

    if failing.is_empty() && homework.reason.is_none() {
        return;
    }

    let _ = writeln!(out, "\n## {}\n", homework.name);
    if homework.expired {
        let _ = writeln!(out, "{EXPIRED_NOTE}");
        return;
    }

    if let Some(reason) = &homework.reason {
        let _ = writeln!(out, "{reason}");
        return;
    }

    for (task, test) in failing {
        let Some(reason) = test.status.reason() else {
            continue;
        };
        test_details(out, task, test, reason);
    }
}

fn test_details(out: &mut String, task: &TaskOutcome, test: &TestOutcome, reason: &FailureReason) {
    let _ = writeln!(out, "<details><summary>{} / {}</summary>\n", task.name, test.name);
    let _ = writeln!(out, "{reason}\n");
    if !test.stderr.is_empty() {
        let _ = writeln!(out, "stderr:\n\n```\n{}\n```\n", test.stderr.trim_end());
    }
    if !test.stdout.is_empty() {
        let _ = writeln!(out, "stdout:\n\n```\n{}\n```\n", test.stdout.trim_end());
    }
    out.push_str("</details>\n");
}

fn symbol(status: &TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => PASSED,
        TestStatus::Failed(_) => FAILED,
        TestStatus::Skipped => SKIPPED,
        TestStatus::Error(_) => ERROR,
    }
}

/// Table cells cannot hold raw pipes or line breaks.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
