/// Supervisor: spawns one worker thread per device, routes
/// cancellation signals, joins with a bounded timeout, and emits the
/// final summary.
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGUSR1};
use signal_hook::iterator::Signals;

use crate::cancel::CancellationToken;
use crate::config::{ConfigError, WipeConfig};
use crate::device::DeviceInput;
use crate::entropy::EntropySource;
use crate::stats::{StatsObserver, WorkerProgress};
use crate::worker::{WorkerConfig, WorkerReport, WorkerResult, WipeWorker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    WorkerErrors = 1,
    InvalidConfiguration = 2,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

pub struct RunOutcome {
    pub reports: Vec<WorkerReport>,
    pub unjoined: Vec<String>,
    pub exit_code: ExitCode,
}

/// Installs the SIGINT/SIGTERM/SIGHUP/SIGQUIT → cancel, SIGUSR1 → status
/// dump signal-dispatch thread. Runs until the process exits; there is
/// no explicit shutdown handle since it only ever reads shared,
/// already-Send state.
fn spawn_signal_dispatch(
    cancel: CancellationToken,
    progresses: Arc<Vec<Arc<WorkerProgress>>>,
    observer: Arc<StatsObserver>,
) -> Result<thread::JoinHandle<()>, std::io::Error> {
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGQUIT, SIGUSR1])?;
    Ok(thread::spawn(move || {
        for signal in signals.forever() {
            match signal {
                SIGINT | SIGTERM | SIGHUP | SIGQUIT => {
                    tracing::warn!(signal, "cancellation signal received");
                    cancel.cancel();
                }
                SIGUSR1 => {
                    for progress in progresses.iter() {
                        let snapshot = observer.snapshot(progress);
                        tracing::info!(
                            device = %snapshot.device_path,
                            phase = snapshot.phase,
                            round = format!("{}/{}", snapshot.round_working, snapshot.round_total),
                            pass = format!("{}/{}", snapshot.pass_working, snapshot.pass_total),
                            percent = format!("{:.1}", snapshot.percent_round),
                            eta_seconds = format!("{:.0}", snapshot.eta_seconds),
                            "status"
                        );
                    }
                }
                _ => {}
            }
        }
    }))
}

pub struct Supervisor {
    config: WipeConfig,
    join_timeout: Duration,
}

impl Supervisor {
    pub fn new(config: WipeConfig) -> Self {
        let join_timeout = Duration::from_secs(config.join_timeout_secs);
        Self { config, join_timeout }
    }

    /// Run the configured wipe across every device in `devices`. Opens
    /// the Entropy Source once and shares it; forks one worker thread per
    /// device; joins each with a bounded timeout; returns the aggregate
    /// outcome and a derived process exit code.
    pub fn run(&self, devices: &[DeviceInput]) -> Result<RunOutcome, ConfigError> {
        if devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }

        let entropy = match EntropySource::open() {
            Ok(source) => Arc::new(Mutex::new(source)),
            Err(err) => {
                tracing::error!(error = %err, "entropy source unavailable");
                return Ok(RunOutcome {
                    reports: Vec::new(),
                    unjoined: Vec::new(),
                    exit_code: ExitCode::InvalidConfiguration,
                });
            }
        };

        let cancel = CancellationToken::new();
        let observer = Arc::new(StatsObserver::new());
        let progresses: Arc<Vec<Arc<WorkerProgress>>> = Arc::new(
            devices
                .iter()
                .map(|d| Arc::new(WorkerProgress::new(d.device_path.clone())))
                .collect(),
        );

        if let Err(err) = spawn_signal_dispatch(cancel.clone(), Arc::clone(&progresses), Arc::clone(&observer)) {
            tracing::warn!(error = %err, "failed to install signal handlers; cancellation via signal will not work");
        }

        let worker_config = WorkerConfig {
            method: self.config.method,
            prng_kind: self.config.prng_kind,
            sync_rate: self.config.sync_rate,
            verify_policy: self.config.verify_policy,
            rounds: self.config.rounds,
            final_blank: self.config.final_blank,
        };

        let mut handles = Vec::with_capacity(devices.len());
        for (device, progress) in devices.iter().zip(progresses.iter()) {
            let (tx, rx) = mpsc::channel();
            let device = device.clone();
            let worker_config = worker_config.clone();
            let entropy = Arc::clone(&entropy);
            let progress = Arc::clone(progress);
            let cancel = cancel.clone();

            let join_handle = thread::spawn(move || {
                let report = WipeWorker::run(&device, &worker_config, &entropy, &progress, &cancel);
                // A send failure just means the supervisor gave up
                // waiting; the worker has nothing further to do either way.
                let _ = tx.send(report);
            });
            handles.push((device.device_path.clone(), join_handle, rx));
        }

        let mut reports = Vec::with_capacity(handles.len());
        let mut unjoined = Vec::new();

        for (device_path, join_handle, rx) in handles {
            match rx.recv_timeout(self.join_timeout) {
                Ok(report) => {
                    reports.push(report);
                    let _ = join_handle.join();
                }
                Err(_) => {
                    tracing::error!(device = %device_path, timeout_secs = self.join_timeout.as_secs(), "worker failed to join within timeout");
                    unjoined.push(device_path);
                }
            }
        }

        log_summary(&self.config, &reports);

        let exit_code = if !unjoined.is_empty() || reports.iter().any(|r| r.result != WorkerResult::Success) {
            ExitCode::WorkerErrors
        } else {
            ExitCode::Success
        };

        Ok(RunOutcome { reports, unjoined, exit_code })
    }
}

const SUMMARY_HEADER: &str =
    "device | method | prng | rounds | verify | pass_err | verify_err | fsync_err | bytes | duration | status";

/// Formats one summary row: `device | method | prng | rounds | verify |
/// pass_err | verify_err | fsync_err | bytes | duration | status`.
fn format_summary_row(config: &WipeConfig, report: &WorkerReport) -> String {
    let duration = report.ended_at.saturating_sub(report.started_at);
    format!(
        "{} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {:?}",
        report.device_path,
        config.method.name(),
        config.prng_kind.name(),
        config.rounds,
        config.verify_policy.name(),
        report.pass_errors,
        report.verify_errors,
        report.fsync_errors,
        report.bytes_written,
        duration,
        report.result
    )
}

/// Logs one summary row per device.
fn log_summary(config: &WipeConfig, reports: &[WorkerReport]) {
    tracing::info!("{SUMMARY_HEADER}");
    for report in reports {
        tracing::info!("{}", format_summary_row(config, report));
    }
}
