//! Bounded retry with exponential backoff
//!
//! The delay starts at the policy's initial backoff and doubles after every
//! failed attempt. There is no jitter and no cap; the attempt bound is the only
//! limit. A failure is followed by a sleep even when it was the last attempt.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use super::{CommandOutput, CommandRunner, CommandSpec};
use crate::config::RetryPolicy;
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};

/// Blocks the calling thread between attempts
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested sleeps without blocking
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }

    pub fn total(&self) -> Duration {
        self.slept().into_iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryableCommand {
    pub command: CommandSpec,
    pub policy: RetryPolicy,
}

impl RetryableCommand {
    pub fn new(command: CommandSpec, policy: RetryPolicy) -> Self {
        Self { command, policy }
    }
}

#[derive(Debug, Clone)]
pub struct RetrySuccess {
    /// 1-based attempt that succeeded
    pub attempts: u32,
    pub output: CommandOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{command}` failed after {attempts} attempt(s): {last_error}")]
pub struct Exhausted {
    pub command: String,
    pub attempts: u32,
    pub last_error: String,
}

pub struct RetryExecutor {
    runner: Arc<dyn CommandRunner>,
    sleeper: Arc<dyn Sleeper>,
    progress: Arc<dyn ProgressHandler>,
}

impl RetryExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            runner,
            sleeper,
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn run(&self, retryable: &RetryableCommand) -> Result<RetrySuccess, Exhausted> {
        let command = &retryable.command;
        let max_attempts = retryable.policy.max_attempts;
        let mut attempts = 0;
        let mut last_error = String::from("command was never executed");

        while attempts < max_attempts {
            let attempt = attempts + 1;
            let delay = retryable.policy.delay_for(attempts);
            match self.runner.run(command) {
                Ok(output) if output.success() => {
                    return Ok(RetrySuccess {
                        attempts: attempt,
                        output,
                    });
                }
                Ok(output) => last_error = output.failure_summary(),
                Err(e) => last_error = format!("{:#}", e),
            }

            warn!(
                "Attempt {}/{} of `{}` failed: {}; retrying in {:?}",
                attempt, max_attempts, command, last_error, delay
            );
            self.progress.on_progress(&ProgressEvent::RetryScheduled {
                command: command.to_string(),
                attempt,
                max_attempts,
                delay,
            });
            self.sleeper.sleep(delay);
            attempts += 1;
        }

        Err(Exhausted {
            command: command.to_string(),
            attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{MockCommandRunner, MockOutcome};
    use crate::progress::RecordingHandler;

    const B: Duration = Duration::from_millis(100);

    fn setup_command() -> RetryableCommand {
        RetryableCommand::new(
            CommandSpec::exec("make", ["setup"]),
            RetryPolicy::new(3, B),
        )
    }

    fn executor(runner: Arc<MockCommandRunner>, sleeper: Arc<RecordingSleeper>) -> RetryExecutor {
        RetryExecutor::new(runner, sleeper)
    }

    #[test]
    fn test_first_attempt_success_never_sleeps() {
        let runner = Arc::new(MockCommandRunner::new());
        let sleeper = Arc::new(RecordingSleeper::new());

        let success = executor(runner.clone(), sleeper.clone())
            .run(&setup_command())
            .unwrap();

        assert_eq!(success.attempts, 1);
        assert!(sleeper.slept().is_empty());
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_success_on_attempt_k_sleeps_first_k_minus_one_delays() {
        for k in 1..=3u32 {
            let runner = Arc::new(MockCommandRunner::new());
            let mut outcomes = vec![MockOutcome::failure(2, "boom"); (k - 1) as usize];
            outcomes.push(MockOutcome::success(""));
            runner.on("make setup", outcomes);
            let sleeper = Arc::new(RecordingSleeper::new());

            let success = executor(runner, sleeper.clone())
                .run(&setup_command())
                .unwrap();

            let expected: Duration = (0..k - 1).map(|i| B * 2u32.pow(i)).sum();
            assert_eq!(success.attempts, k);
            assert_eq!(sleeper.total(), expected);
        }
    }

    #[test]
    fn test_always_failing_command_is_attempted_exactly_max_times() {
        let runner = Arc::new(MockCommandRunner::new());
        runner.always("make setup", MockOutcome::failure(1, "no rule to make target"));
        let sleeper = Arc::new(RecordingSleeper::new());
        let progress = Arc::new(RecordingHandler::new());

        let exhausted = executor(runner.clone(), sleeper.clone())
            .with_progress(progress.clone())
            .run(&setup_command())
            .unwrap_err();

        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.command, "make setup");
        assert!(exhausted.last_error.contains("no rule to make target"));
        assert_eq!(runner.calls().len(), 3);
        assert_eq!(sleeper.slept(), vec![B, B * 2, B * 4]);
        assert_eq!(progress.retry_delays(), vec![B, B * 2, B * 4]);
    }

    #[test]
    fn test_spawn_errors_count_as_failed_attempts() {
        let runner = Arc::new(MockCommandRunner::new());
        runner.on(
            "make setup",
            vec![MockOutcome::spawn_error("make: not found"), MockOutcome::success("")],
        );
        let sleeper = Arc::new(RecordingSleeper::new());

        let success = executor(runner, sleeper.clone())
            .run(&setup_command())
            .unwrap();

        assert_eq!(success.attempts, 2);
        assert_eq!(sleeper.slept(), vec![B]);
    }

    #[test]
    fn test_zero_attempts_never_executes() {
        let runner = Arc::new(MockCommandRunner::new());
        let sleeper = Arc::new(RecordingSleeper::new());
        let command = RetryableCommand::new(
            CommandSpec::exec("make", ["setup"]),
            RetryPolicy::new(0, B),
        );

        let exhausted = executor(runner.clone(), sleeper.clone())
            .run(&command)
            .unwrap_err();

        assert_eq!(exhausted.attempts, 0);
        assert!(runner.calls().is_empty());
        assert!(sleeper.slept().is_empty());
    }
}
