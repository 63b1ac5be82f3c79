use framesmith::cli::CliArgs;
use framesmith::pipeline::log_interrupted;
use framesmith::{
    init_logging, LoggingConfig, Orchestrator, RunConfig, RunContext, RunSettings, StageTracker,
    VERSION,
};

use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error};

const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match RunSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            match RunSettings::base_from_env() {
                Ok(base) if base.validate().is_ok() => {
                    start_logging(&base);
                    error!("Invalid configuration: {}", e);
                }
                _ => eprintln!("framesmith: {}", e),
            }
            return ExitCode::from(1);
        }
    };

    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            start_logging(&settings);
            error!("Invalid arguments: {}", e.to_string().trim_end());
            return ExitCode::from(1);
        }
    };

    start_logging(&settings);
    debug!("framesmith v{} starting", VERSION);

    let config = match RunConfig::new(&args.organization, settings) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::from(1);
        }
    };
    debug!("{}", config);

    let tracker = StageTracker::new();
    let orchestrator = Orchestrator::new(RunContext::new(config)).with_tracker(tracker.clone());
    let run = tokio::task::spawn_blocking(move || orchestrator.run());

    tokio::select! {
        joined = run => match joined {
            Ok(Ok(_report)) => ExitCode::SUCCESS,
            Ok(Err(e)) => ExitCode::from(e.exit_code()),
            Err(e) => {
                error!("Run task ended abnormally: {}", e);
                ExitCode::from(1)
            }
        },
        signal = shutdown_signal() => {
            log_interrupted(&tracker, signal);
            // the blocking run cannot be cancelled; leave without waiting for it
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }
}

fn start_logging(settings: &RunSettings) {
    let config = LoggingConfig::from_env().with_log_file(settings.log_file());
    if let Err(e) = init_logging(config) {
        eprintln!("framesmith: logging unavailable: {:#}", e);
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
