use std::path::Path;
use std::time::Duration;

use chrono::NaiveDateTime;
use homework_checker::config::{ExpectedOutput, Homework, JobSpec, Task, Test};
use homework_checker::types::OutputKind;

/// Builder for `JobSpec` to simplify test setup.
pub struct JobSpecBuilder {
    job: JobSpec,
}

impl JobSpecBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            job: JobSpec::new(root.as_ref(), Vec::new()),
        }
    }

    pub fn job_dir(mut self, job_dir: impl AsRef<Path>) -> Self {
        self.job = self.job.with_job_dir(job_dir.as_ref());
        self
    }

    pub fn homework(mut self, homework: Homework) -> Self {
        self.job.homeworks.push(homework);
        self
    }

    pub fn build(self) -> JobSpec {
        self.job
    }
}

/// Builder for `Homework`.
pub struct HomeworkBuilder {
    homework: Homework,
}

impl HomeworkBuilder {
    pub fn new(name: &str, folder: &str) -> Self {
        Self {
            homework: Homework {
                name: name.to_string(),
                folder: folder.to_string(),
                deadline: None,
                tasks: Vec::new(),
            },
        }
    }

    pub fn deadline(mut self, deadline: NaiveDateTime) -> Self {
        self.homework.deadline = Some(deadline);
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.homework.tasks.push(task);
        self
    }

    pub fn build(self) -> Homework {
        self.homework
    }
}

/// Builder for `Task`.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(name: &str, folder: &str) -> Self {
        Self {
            task: Task {
                name: name.to_string(),
                folder: folder.to_string(),
                tests: Vec::new(),
            },
        }
    }

    pub fn test(mut self, test: Test) -> Self {
        self.task.tests.push(test);
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for `Test`.
pub struct TestBuilder {
    test: Test,
}

impl TestBuilder {
    pub fn new(name: &str, cmd: &str) -> Self {
        Self {
            test: Test {
                name: name.to_string(),
                cmd: cmd.to_string(),
                output_kind: None,
                expected: None,
                timeout: None,
            },
        }
    }

    /// Expect exact string output.
    pub fn expect_text(mut self, expected: &str) -> Self {
        self.test.output_kind = Some(OutputKind::String);
        self.test.expected = Some(ExpectedOutput::Text(expected.to_string()));
        self
    }

    /// Expect numeric output.
    pub fn expect_number(mut self, expected: f64) -> Self {
        self.test.output_kind = Some(OutputKind::Number);
        self.test.expected = Some(ExpectedOutput::Number(expected));
        self
    }

    pub fn output_kind(mut self, kind: OutputKind) -> Self {
        self.test.output_kind = Some(kind);
        self
    }

    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.test.timeout = Some(Duration::from_secs_f64(secs));
        self
    }

    pub fn build(self) -> Test {
        self.test
    }
}
