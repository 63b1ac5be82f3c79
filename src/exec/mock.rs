use super::{CommandOutput, CommandRunner, CommandSpec};
use anyhow::{anyhow, Result};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// Scripted result of one mocked command invocation
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Exit(CommandOutput),
    SpawnError(String),
}

impl MockOutcome {
    pub fn success(stdout: impl Into<String>) -> Self {
        MockOutcome::Exit(CommandOutput {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        })
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        MockOutcome::Exit(CommandOutput {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        })
    }

    pub fn spawn_error(message: impl Into<String>) -> Self {
        MockOutcome::SpawnError(message.into())
    }
}

struct Script {
    pattern: String,
    queued: VecDeque<MockOutcome>,
    fallback: Option<MockOutcome>,
}

/// Command runner that replays scripted outcomes
///
/// A command matches a script when its display form starts with the script's
/// pattern. Queued outcomes are consumed in order; once a queue is empty the
/// script's fallback applies, and unscripted commands succeed.
pub struct MockCommandRunner {
    scripts: Mutex<Vec<Script>>,
    available: Mutex<HashSet<String>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            available: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Marks programs as resolvable on `PATH`
    pub fn with_available<I, S>(self, programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_available(programs);
        self
    }

    pub fn set_available<I, S>(&self, programs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut available = self.available.lock().unwrap();
        available.extend(programs.into_iter().map(Into::into));
    }

    pub fn set_unavailable(&self, program: &str) {
        self.available.lock().unwrap().remove(program);
    }

    /// Queues outcomes for commands starting with `pattern`
    pub fn on(&self, pattern: impl Into<String>, outcomes: impl IntoIterator<Item = MockOutcome>) {
        let pattern = pattern.into();
        let mut scripts = self.scripts.lock().unwrap();
        let script = Self::script_for(&mut scripts, pattern);
        script.queued.extend(outcomes);
    }

    /// Outcome for every invocation once queued outcomes are used up
    pub fn always(&self, pattern: impl Into<String>, outcome: MockOutcome) {
        let pattern = pattern.into();
        let mut scripts = self.scripts.lock().unwrap();
        Self::script_for(&mut scripts, pattern).fallback = Some(outcome);
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.to_string().starts_with(pattern))
            .count()
    }

    fn script_for(scripts: &mut Vec<Script>, pattern: String) -> &mut Script {
        let index = match scripts.iter().position(|s| s.pattern == pattern) {
            Some(index) => index,
            None => {
                scripts.push(Script {
                    pattern,
                    queued: VecDeque::new(),
                    fallback: None,
                });
                scripts.len() - 1
            }
        };
        &mut scripts[index]
    }
}

impl Default for MockCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());

        let rendered = command.to_string();
        let outcome = {
            let mut scripts = self.scripts.lock().unwrap();
            scripts
                .iter_mut()
                .filter(|script| rendered.starts_with(&script.pattern))
                .max_by_key(|script| script.pattern.len())
                .and_then(|script| script.queued.pop_front().or_else(|| script.fallback.clone()))
        };

        match outcome.unwrap_or_else(|| MockOutcome::success("")) {
            MockOutcome::Exit(output) => Ok(output),
            MockOutcome::SpawnError(message) => Err(anyhow!(message)),
        }
    }

    fn is_available(&self, program: &str) -> bool {
        self.available.lock().unwrap().contains(program)
    }
}
