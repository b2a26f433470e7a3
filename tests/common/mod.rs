#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub use homework_checker_test_utils::builders;
pub use homework_checker_test_utils::fake_runner;
pub use homework_checker_test_utils::{init_tracing, with_timeout};

use homework_checker::engine::{HomeworkOutcome, TestStatus};

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Test statuses of a task, in declared order.
pub fn statuses(homework: &HomeworkOutcome, task: &str) -> Vec<TestStatus> {
    homework
        .task(task)
        .unwrap_or_else(|| panic!("no task named {task}"))
        .tests
        .iter()
        .map(|t| t.status.clone())
        .collect()
}
