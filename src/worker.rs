/// Wipe Worker: runs one device end-to-end — open, seed, expand
/// the method, drive the Pass Executor round by round, publish progress.
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::cancel::CancellationToken;
use crate::device::DeviceInput;
use crate::entropy::EntropySource;
use crate::error::{ExponentialBackoff, WipeError, WipeResult};
use crate::io::choose_chunk_size;
use crate::method::{Method, PassDirection, PassLabel, VerifyPolicy};
use crate::pass::{PassExecutor, PassStatus, SyncPolicy};
use crate::pattern::{PatternSource, PatternSpec};
use crate::prng::{PrngKind, MIN_SEED_BYTES};
use crate::stats::{Phase, WorkerProgress};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub method: Method,
    pub prng_kind: PrngKind,
    pub sync_rate: u32,
    pub verify_policy: VerifyPolicy,
    pub rounds: u32,
    pub final_blank: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerResult {
    Success,
    CancelledByOperator,
    Failed,
}

#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub device_path: String,
    pub bytes_written: u64,
    pub pass_errors: u64,
    pub verify_errors: u64,
    pub fsync_errors: u64,
    pub result: WorkerResult,
    pub started_at: u64,
    pub ended_at: u64,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Open the device for read+write, retrying a `DeviceOpenFailed` with
/// exponential backoff before giving up. Most opens succeed first try;
/// this only matters for devices transiently busy (e.g. settling after a
/// previous close) at worker start.
fn open_device_with_retry(path: &str) -> WipeResult<std::fs::File> {
    let backoff = ExponentialBackoff::device_open();
    let mut attempt = 0;
    loop {
        match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => return Ok(file),
            Err(source) => {
                if backoff.should_retry(attempt) {
                    tracing::warn!(device = path, attempt, "device open failed, retrying");
                    std::thread::sleep(backoff.delay(attempt));
                    attempt += 1;
                    continue;
                }
                return Err(WipeError::DeviceOpenFailed {
                    path: path.to_string(),
                    source,
                });
            }
        }
    }
}

/// Resolve the device's true byte length via `lseek(SEEK_END)`. If the
/// caller's declared size disagrees, that's logged as a diagnostic but
/// the `lseek` value is what the worker actually uses.
fn resolve_size(path: &str, device: &mut std::fs::File, declared_size: u64) -> WipeResult<u64> {
    let seek_end_size = device.seek(SeekFrom::End(0)).map_err(|source| WipeError::DeviceOpenFailed {
        path: path.to_string(),
        source,
    })?;
    device
        .seek(SeekFrom::Start(0))
        .map_err(|source| WipeError::FatalIOError { offset: 0, source })?;

    if seek_end_size != declared_size {
        tracing::warn!(
            declared_size,
            seek_end_size,
            device = path,
            "device size disagreement (last-odd-block); using lseek(SEEK_END) value"
        );
    }
    Ok(seek_end_size)
}

/// Accumulates the per-pass outcome into the worker's running totals and
/// the progress counters in one place, since every branch below needs the
/// same bookkeeping.
#[derive(Default)]
struct Totals {
    bytes_written: u64,
    pass_errors: u64,
    verify_errors: u64,
    fsync_errors: u64,
}

pub struct WipeWorker;

impl WipeWorker {
    /// Run one device end-to-end. Always returns a full report, even on
    /// failure; the caller (Supervisor) decides process exit status from
    /// the aggregate of all workers' reports.
    pub fn run(
        device_input: &DeviceInput,
        config: &WorkerConfig,
        entropy: &Arc<std::sync::Mutex<EntropySource>>,
        progress: &WorkerProgress,
        cancel: &CancellationToken,
    ) -> WorkerReport {
        let started_at = now_unix();
        progress.set_phase(Phase::Opening);

        let outcome = Self::run_inner(device_input, config, entropy, progress, cancel);
        progress.set_phase(Phase::Done);
        let ended_at = now_unix();

        match outcome {
            Ok((totals, cancelled)) => {
                let has_errors = totals.pass_errors > 0 || totals.verify_errors > 0 || totals.fsync_errors > 0;
                WorkerReport {
                    device_path: device_input.device_path.clone(),
                    bytes_written: totals.bytes_written,
                    pass_errors: totals.pass_errors,
                    verify_errors: totals.verify_errors,
                    fsync_errors: totals.fsync_errors,
                    result: if cancelled {
                        WorkerResult::CancelledByOperator
                    } else if has_errors {
                        WorkerResult::Failed
                    } else {
                        WorkerResult::Success
                    },
                    started_at,
                    ended_at,
                }
            }
            Err(err) => {
                tracing::error!(device = %device_input.device_path, error = %err, "worker failed");
                WorkerReport {
                    device_path: device_input.device_path.clone(),
                    bytes_written: progress.bytes_erased(),
                    pass_errors: 1,
                    verify_errors: 0,
                    fsync_errors: 0,
                    result: WorkerResult::Failed,
                    started_at,
                    ended_at,
                }
            }
        }
    }

    fn run_inner(
        device_input: &DeviceInput,
        config: &WorkerConfig,
        entropy: &Arc<std::sync::Mutex<EntropySource>>,
        progress: &WorkerProgress,
        cancel: &CancellationToken,
    ) -> WipeResult<(Totals, bool)> {
        let mut device = open_device_with_retry(&device_input.device_path)?;

        let size_bytes = resolve_size(&device_input.device_path, &mut device, device_input.size_bytes)?;

        let seed = entropy.lock().unwrap().read(MIN_SEED_BYTES)?;

        let passes = config
            .method
            .expand(config.rounds, config.verify_policy, config.final_blank);

        let repeated_pass_count = passes
            .iter()
            .filter(|p| !matches!(p.label, PassLabel::FinalBlank | PassLabel::FinalOps2))
            .count() as u32;
        let passes_per_round = (repeated_pass_count / config.rounds.max(1)).max(1);
        let round_size = size_bytes.saturating_mul(passes_per_round as u64);
        let total_bytes = size_bytes.saturating_mul(passes.len() as u64);
        progress.set_totals(config.rounds, passes.len() as u32, round_size, total_bytes);

        let chunk_size = choose_chunk_size(device_input.logical_sector_size as usize);
        let sync_policy = if config.sync_rate == 0 {
            SyncPolicy::End
        } else {
            SyncPolicy::Every(config.sync_rate)
        };
        let executor = PassExecutor::new(chunk_size, sync_policy);

        let mut totals = Totals::default();
        let mut current_round = 0u32;

        for (index, pass) in passes.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok((totals, true));
            }

            let round_for_pass = if matches!(pass.label, PassLabel::FinalBlank | PassLabel::FinalOps2) {
                current_round.max(1)
            } else {
                current_round = (index as u32 / passes_per_round) + 1;
                current_round
            };
            progress.set_round_working(round_for_pass.min(config.rounds.max(1)));
            progress.set_pass_working(index as u32 + 1);
            progress.set_phase(match pass.label {
                PassLabel::FinalBlank => Phase::FinalBlank,
                PassLabel::FinalOps2 => Phase::FinalOps2,
                PassLabel::Normal => Phase::Writing,
            });

            // Derive a per-pass seed from the worker's entropy-seeded
            // bytes plus the pass index, rather than reusing the same
            // bytes for every pass. This is what lets a later verify call
            // regenerate the identical stream a write call produced
            // (both derive from the same index), while still giving every
            // random pass in the method its own distinct stream.
            let mut index_seed = seed.clone();
            index_seed.extend_from_slice(&(index as u64).to_le_bytes());
            let mut pass_seed = [0u8; MIN_SEED_BYTES];
            config.prng_kind.create(&index_seed).fill(&mut pass_seed);

            if matches!(pass.direction, PassDirection::VerifyOnly) {
                progress.set_phase(Phase::Verifying);
                let mut owner = PatternSourceOwner::new(pass.pattern, &config.prng_kind, &pass_seed);
                let mut source = owner.source(pass.pattern);
                device
                    .seek(SeekFrom::Start(0))
                    .map_err(|source| WipeError::FatalIOError { offset: 0, source })?;
                let result = executor.run_verify(&mut device, &mut source, size_bytes, cancel)?;
                totals.verify_errors += result.verify_errors;
                progress.add_verify_errors(result.verify_errors);
                totals.pass_errors += result.pass_errors;
                progress.add_pass_errors(result.pass_errors);
                if result.status == PassStatus::Cancelled {
                    return Ok((totals, true));
                }
                continue;
            }

            let verify_after = matches!(pass.direction, PassDirection::Write { verify_after: true });

            let mut write_owner = PatternSourceOwner::new(pass.pattern, &config.prng_kind, &pass_seed);
            let mut write_source = write_owner.source(pass.pattern);
            device
                .seek(SeekFrom::Start(0))
                .map_err(|source| WipeError::FatalIOError { offset: 0, source })?;
            let write_result = executor.run_write(&mut device, &mut write_source, size_bytes, cancel)?;

            totals.bytes_written += write_result.bytes_processed;
            progress.add_bytes_erased(write_result.bytes_processed);
            totals.pass_errors += write_result.pass_errors;
            progress.add_pass_errors(write_result.pass_errors);
            totals.fsync_errors += write_result.fsync_errors;
            progress.add_fsync_errors(write_result.fsync_errors);

            if write_result.status == PassStatus::Cancelled {
                return Ok((totals, true));
            }
            if write_result.status == PassStatus::Aborted {
                return Err(WipeError::FatalIOError {
                    offset: 0,
                    source: std::io::Error::new(std::io::ErrorKind::Other, "pass aborted by a fatal I/O error"),
                });
            }

            if verify_after {
                progress.set_phase(Phase::Verifying);
                let mut verify_owner = PatternSourceOwner::new(pass.pattern, &config.prng_kind, &pass_seed);
                let mut verify_source = verify_owner.source(pass.pattern);
                device
                    .seek(SeekFrom::Start(0))
                    .map_err(|source| WipeError::FatalIOError { offset: 0, source })?;
                let verify_result = executor.run_verify(&mut device, &mut verify_source, size_bytes, cancel)?;
                totals.verify_errors += verify_result.verify_errors;
                progress.add_verify_errors(verify_result.verify_errors);
                totals.pass_errors += verify_result.pass_errors;
                progress.add_pass_errors(verify_result.pass_errors);

                if verify_result.status == PassStatus::Cancelled {
                    return Ok((totals, true));
                }
            }
        }

        Ok((totals, false))
    }
}

/// Owns the PRNG instance (if any) backing one call to `run_write` or
/// `run_verify`. A fresh instance is constructed from the pass's seed
/// each time one of these is built, which is what lets an independent
/// write call and verify call regenerate identical streams: neither
/// borrows the other's state, they are separately reseeded from the same
/// bytes.
struct PatternSourceOwner {
    prng: Option<Box<dyn crate::prng::Prng>>,
}

impl PatternSourceOwner {
    fn new(pattern: PatternSpec, kind: &PrngKind, pass_seed: &[u8]) -> Self {
        Self {
            prng: pattern.is_random().then(|| kind.create(pass_seed)),
        }
    }

    fn source(&mut self, pattern: PatternSpec) -> PatternSource<'_> {
        match pattern {
            PatternSpec::Fixed(bytes) => PatternSource::constant(bytes),
            PatternSpec::Random => PatternSource::random(
                self.prng
                    .as_deref_mut()
                    .expect("PatternSourceOwner constructed without a PRNG for a random pattern"),
            ),
        }
    }
}
