//! End-to-end pipeline runs against scripted collaborators
//!
//! The real file system and packager are used inside a temp directory; the
//! command runner, sleeper and disk probe are mocks, so no external tool runs.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use framesmith::exec::{MockCommandRunner, MockOutcome, RecordingSleeper};
use framesmith::fs::MockFileSystem;
use framesmith::package::{archive, collect_files, MANIFEST_FILE};
use framesmith::pipeline::{Outcome, Stage};
use framesmith::preflight::FixedDiskProbe;
use framesmith::progress::{ProgressEvent, RecordingHandler};
use framesmith::repair::RepairOutcome;
use framesmith::{
    FatalError, Orchestrator, PipelineState, RetryPolicy, RunConfig, RunContext, RunSettings,
    StageTracker,
};
use tempfile::TempDir;

const BACKOFF: Duration = Duration::from_millis(10);

struct Harness {
    runner: Arc<MockCommandRunner>,
    sleeper: Arc<RecordingSleeper>,
    progress: Arc<RecordingHandler>,
    tracker: StageTracker,
}

impl Harness {
    fn new() -> Self {
        Self {
            runner: Arc::new(
                MockCommandRunner::new().with_available(["brew", "make", "bash", "ansible-lint", "docker"]),
            ),
            sleeper: Arc::new(RecordingSleeper::new()),
            progress: Arc::new(RecordingHandler::new()),
            tracker: StageTracker::new(),
        }
    }

    fn config(&self, root: &Path, organization: &str) -> RunConfig {
        let settings = RunSettings::new(root).with_retry(RetryPolicy::new(3, BACKOFF));
        RunConfig::new(organization, settings).unwrap()
    }

    fn context(&self, config: RunConfig) -> RunContext {
        RunContext::new(config)
            .with_runner(self.runner.clone())
            .with_sleeper(self.sleeper.clone())
            .with_disk_probe(Arc::new(FixedDiskProbe::new(35.0)))
            .with_progress(self.progress.clone())
    }

    fn orchestrator(&self, root: &Path, organization: &str) -> Orchestrator {
        Orchestrator::new(self.context(self.config(root, organization)))
            .with_tracker(self.tracker.clone())
    }
}

#[test]
fn test_google_run_reaches_done_with_both_archives() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();

    let report = harness.orchestrator(root.path(), "Google").run().unwrap();

    assert_eq!(report.final_state, PipelineState::Done);
    assert_eq!(
        report.history,
        vec![
            PipelineState::Init,
            PipelineState::Generated,
            PipelineState::SetupDone,
            PipelineState::Built,
            PipelineState::Repaired,
            PipelineState::Packaged,
            PipelineState::Done,
        ]
    );

    let framework = root.path().join("GOOGLE_enterprise_framework");
    assert_eq!(report.framework_dir, framework);
    assert!(framework.join("services/go-service/main.go").is_file());
    assert!(framework.join("services/python-api/app.py").is_file());
    assert!(framework.join(MANIFEST_FILE).is_file());

    let artifacts = root.path().join("artifacts");
    assert!(artifacts.join("GOOGLE_enterprise_framework_v1.0.0.zip").is_file());
    assert!(artifacts.join("GOOGLE_enterprise_framework_v1.0.0.tar.gz").is_file());
    assert!(artifacts.join("GOOGLE_enterprise_framework_v1.0.0.json").is_file());
    assert_eq!(report.artifacts.len(), 2);
    assert_eq!(harness.tracker.current(), PipelineState::Done);
}

#[test]
fn test_manifest_and_archives_agree_with_tree() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();

    let report = harness.orchestrator(root.path(), "netflix").run().unwrap();

    let framework = &report.framework_dir;
    let manifest: Vec<String> = std::fs::read_to_string(framework.join(MANIFEST_FILE))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();

    let mut sorted = manifest.clone();
    sorted.sort();
    assert_eq!(manifest, sorted);
    assert!(manifest.contains(&MANIFEST_FILE.to_string()));
    assert_eq!(collect_files(framework).unwrap(), manifest);
    assert_eq!(report.manifest_files, manifest);

    let prefix = "NETFLIX_enterprise_framework";
    let artifacts = root.path().join("artifacts");
    let zip = archive::list_zip(&artifacts.join(format!("{}_v1.0.0.zip", prefix)), prefix).unwrap();
    let tar = archive::list_tar_gz(&artifacts.join(format!("{}_v1.0.0.tar.gz", prefix)), prefix).unwrap();
    assert_eq!(zip, manifest);
    assert_eq!(tar, manifest);
}

#[test]
fn test_setup_and_build_run_in_tree_once_each() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();

    let report = harness.orchestrator(root.path(), "Amazon").run().unwrap();

    let calls = harness.runner.calls();
    let setup: Vec<_> = calls.iter().filter(|c| c.to_string() == "make setup").collect();
    let build: Vec<_> = calls.iter().filter(|c| c.to_string() == "bash build.sh").collect();
    assert_eq!(setup.len(), 1);
    assert_eq!(build.len(), 1);
    assert_eq!(setup[0].cwd(), Some(report.framework_dir.as_path()));
    assert_eq!(build[0].cwd(), Some(report.framework_dir.as_path()));
    assert!(harness.sleeper.slept().is_empty());
}

#[test]
fn test_setup_exhaustion_aborts_without_artifacts() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();
    harness
        .runner
        .always("make setup", MockOutcome::failure(2, "make: *** [setup] Error 1"));

    let err = harness.orchestrator(root.path(), "Google").run().unwrap_err();

    match &err {
        FatalError::RetriesExhausted {
            stage, attempts, ..
        } => {
            assert_eq!(*stage, Stage::Setup);
            assert_eq!(*attempts, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.exit_code(), 1);
    assert_eq!(harness.runner.calls_matching("make setup"), 3);
    assert_eq!(harness.runner.calls_matching("bash build.sh"), 0);
    assert_eq!(harness.sleeper.slept(), vec![BACKOFF, BACKOFF * 2, BACKOFF * 4]);
    assert_eq!(harness.tracker.current(), PipelineState::Aborted);
    assert!(!root.path().join("artifacts/GOOGLE_enterprise_framework_v1.0.0.zip").exists());

    // the partially built tree stays on disk
    assert!(root.path().join("GOOGLE_enterprise_framework/Makefile").is_file());
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_setup_exhaustion_logs_doubling_warnings_before_fatal_line() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();
    harness.runner.always("make setup", MockOutcome::failure(2, "boom"));
    let orchestrator = harness.orchestrator(root.path(), "Google");

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, || orchestrator.run());
    assert!(result.is_err());

    let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    let warnings: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.contains("WARN") && l.contains("`make setup`"))
        .map(|(i, l)| (i, *l))
        .collect();

    assert_eq!(warnings.len(), 3);
    for ((_, line), delay) in warnings.iter().zip(["10ms", "20ms", "40ms"]) {
        assert!(line.contains(&format!("retrying in {}", delay)), "{}", line);
    }

    let last_warning = warnings[2].0;
    let fatal = lines
        .iter()
        .rposition(|l| l.contains("ERROR"))
        .unwrap();
    assert!(fatal > last_warning);
    assert!(lines[fatal].contains("exhausted 3 attempt(s)"));
}

#[test]
fn test_build_success_on_second_attempt() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();
    harness.runner.on(
        "bash build.sh",
        vec![MockOutcome::failure(1, "transient"), MockOutcome::success("")],
    );

    let report = harness.orchestrator(root.path(), "Uber").run().unwrap();

    assert!(report.is_done());
    assert_eq!(harness.sleeper.slept(), vec![BACKOFF]);
    let build = report
        .stage_results
        .iter()
        .find(|r| r.stage == Stage::Build)
        .unwrap();
    assert_eq!(build.attempts, 2);
    assert_eq!(harness.progress.retry_delays(), vec![BACKOFF]);
}

#[test]
fn test_second_run_backs_up_first_tree() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();

    let first = harness.orchestrator(root.path(), "Meta").run().unwrap();
    assert!(first.backup.is_none());
    std::fs::write(first.framework_dir.join("operator-notes.txt"), "keep me").unwrap();

    let second = Harness::new().orchestrator(root.path(), "META").run().unwrap();

    let backup = second.backup.clone().unwrap();
    assert_ne!(backup, second.framework_dir);
    assert!(backup
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("META_enterprise_framework.backup-"));
    assert_eq!(
        std::fs::read_to_string(backup.join("operator-notes.txt")).unwrap(),
        "keep me"
    );
    assert!(!second.framework_dir.join("operator-notes.txt").exists());

    let backups_in_artifacts = std::fs::read_dir(root.path().join("artifacts"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().contains(".backup-"))
        .count();
    assert_eq!(backups_in_artifacts, 3);
}

#[test]
fn test_repair_failures_never_abort() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();
    harness
        .runner
        .always("ansible-lint", MockOutcome::failure(2, "syntax-check[specific]"));
    harness
        .runner
        .always("docker build", MockOutcome::failure(1, "failed to solve"));

    let report = harness.orchestrator(root.path(), "Spotify").run().unwrap();

    assert!(report.is_done());
    assert_eq!(report.repairs.len(), 2);
    assert!(report
        .repairs
        .iter()
        .all(|r| matches!(r.outcome, RepairOutcome::Failed(_))));
    let repair = report
        .stage_results
        .iter()
        .find(|r| r.stage == Stage::Repair)
        .unwrap();
    assert_eq!(repair.outcome, Outcome::AdvisoryFailure);

    let reported: Vec<(String, bool)> = harness
        .progress
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ProgressEvent::RepairReported { fixer, success, .. } => Some((fixer, success)),
            _ => None,
        })
        .collect();
    assert_eq!(
        reported,
        vec![
            ("playbook-lint".to_string(), false),
            ("container-smoke-test".to_string(), false),
        ]
    );
}

#[test]
fn test_missing_repair_tools_are_skipped() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();
    harness.runner.set_unavailable("ansible-lint");
    harness.runner.set_unavailable("docker");

    let report = harness.orchestrator(root.path(), "Apple").run().unwrap();

    assert!(report.is_done());
    assert!(report
        .repairs
        .iter()
        .all(|r| matches!(r.outcome, RepairOutcome::Skipped(_))));
}

#[test]
fn test_generation_write_failure_aborts() {
    let harness = Harness::new();
    let fs = Arc::new(MockFileSystem::new());
    fs.add_dir("/mock/root");
    let config = harness.config(Path::new("/mock/root"), "Mozilla");
    fs.fail_writes_under(config.framework_dir().join("services"));

    let orchestrator = Orchestrator::new(harness.context(config).with_file_system(fs.clone()))
        .with_tracker(harness.tracker.clone());
    let err = orchestrator.run().unwrap_err();

    assert!(matches!(err, FatalError::Generation { .. }));
    assert_eq!(harness.tracker.current(), PipelineState::Aborted);
    assert_eq!(harness.runner.calls_matching("make"), 0);
    assert!(harness.progress.events().iter().any(|e| matches!(
        e,
        ProgressEvent::StateChanged {
            from: PipelineState::Init,
            to: PipelineState::Aborted
        }
    )));
}

#[test]
fn test_unsupported_organization_touches_nothing() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();

    let err = harness.orchestrator(root.path(), "Nonexistent").run().unwrap_err();

    assert!(err.to_string().contains("Nonexistent"));
    assert!(harness.runner.calls().is_empty());
    assert!(!root.path().join("NONEXISTENT_enterprise_framework").exists());
    assert!(!root.path().join("artifacts").exists());
    assert_eq!(harness.tracker.current(), PipelineState::Aborted);
}

#[test]
fn test_full_disk_aborts_before_generation() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();
    let config = harness.config(root.path(), "Google");
    let orchestrator = Orchestrator::new(
        harness
            .context(config)
            .with_disk_probe(Arc::new(FixedDiskProbe::new(97.5))),
    );

    let err = orchestrator.run().unwrap_err();

    assert!(matches!(err, FatalError::DiskUsage { .. }));
    assert!(!root.path().join("GOOGLE_enterprise_framework").exists());
}

#[test]
fn test_missing_package_manager_is_bootstrapped() {
    let root = TempDir::new().unwrap();
    let harness = Harness::new();
    harness.runner.set_unavailable("brew");
    harness
        .runner
        .always("sh -c", MockOutcome::failure(1, "curl: (6) Could not resolve host"));

    let err = harness.orchestrator(root.path(), "Google").run().unwrap_err();

    assert!(matches!(err, FatalError::Bootstrap { .. }));
    assert!(!root.path().join("GOOGLE_enterprise_framework").exists());
}
