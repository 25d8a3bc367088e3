/// Statistics & ETA: per-worker progress published without blocking
/// the worker, and a separate observer that turns raw counters into
/// throughput/percent/ETA on request.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Opening,
    Seeding,
    Writing,
    Verifying,
    FinalBlank,
    FinalOps2,
    Done,
}

impl Phase {
    fn to_code(self) -> u8 {
        match self {
            Phase::Opening => 0,
            Phase::Seeding => 1,
            Phase::Writing => 2,
            Phase::Verifying => 3,
            Phase::FinalBlank => 4,
            Phase::FinalOps2 => 5,
            Phase::Done => 6,
        }
    }

    fn from_code(code: u8) -> Self {
        match code {
            0 => Phase::Opening,
            1 => Phase::Seeding,
            2 => Phase::Writing,
            3 => Phase::Verifying,
            4 => Phase::FinalBlank,
            5 => Phase::FinalOps2,
            _ => Phase::Done,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Opening => "opening",
            Phase::Seeding => "seeding",
            Phase::Writing => "writing",
            Phase::Verifying => "verifying",
            Phase::FinalBlank => "final-blank",
            Phase::FinalOps2 => "final-ops2",
            Phase::Done => "done",
        }
    }
}

/// Progress counters for one worker, updated by word-sized atomic writes
/// so that an observer thread never blocks the worker it is watching.
pub struct WorkerProgress {
    pub device_path: String,
    phase: AtomicU8,
    round_working: AtomicU32,
    round_total: AtomicU32,
    pass_working: AtomicU32,
    pass_total: AtomicU32,
    bytes_erased: AtomicU64,
    bytes_this_round: AtomicU64,
    round_size: AtomicU64,
    total_bytes: AtomicU64,
    pass_errors: AtomicU64,
    verify_errors: AtomicU64,
    fsync_errors: AtomicU64,
}

impl WorkerProgress {
    pub fn new(device_path: impl Into<String>) -> Self {
        Self {
            device_path: device_path.into(),
            phase: AtomicU8::new(Phase::Opening.to_code()),
            round_working: AtomicU32::new(0),
            round_total: AtomicU32::new(0),
            pass_working: AtomicU32::new(0),
            pass_total: AtomicU32::new(0),
            bytes_erased: AtomicU64::new(0),
            bytes_this_round: AtomicU64::new(0),
            round_size: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            pass_errors: AtomicU64::new(0),
            verify_errors: AtomicU64::new(0),
            fsync_errors: AtomicU64::new(0),
        }
    }

    pub fn set_phase(&self, phase: Phase) {
        self.phase.store(phase.to_code(), Ordering::Relaxed);
    }

    pub fn set_totals(&self, round_total: u32, pass_total: u32, round_size: u64, total_bytes: u64) {
        self.round_total.store(round_total, Ordering::Relaxed);
        self.pass_total.store(pass_total, Ordering::Relaxed);
        self.round_size.store(round_size, Ordering::Relaxed);
        self.total_bytes.store(total_bytes, Ordering::Relaxed);
    }

    pub fn set_round_working(&self, round: u32) {
        self.round_working.store(round, Ordering::Relaxed);
        self.bytes_this_round.store(0, Ordering::Relaxed);
    }

    pub fn set_pass_working(&self, pass: u32) {
        self.pass_working.store(pass, Ordering::Relaxed);
    }

    /// Advance `bytes_erased` after a successful write chunk.
    /// Verification never calls this; it never advances `bytes_erased`.
    pub fn add_bytes_erased(&self, n: u64) {
        self.bytes_erased.fetch_add(n, Ordering::Relaxed);
        self.bytes_this_round.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_pass_errors(&self, n: u64) {
        self.pass_errors.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_verify_errors(&self, n: u64) {
        self.verify_errors.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_fsync_errors(&self, n: u64) {
        self.fsync_errors.fetch_add(n, Ordering::Relaxed);
    }

    pub fn bytes_erased(&self) -> u64 {
        self.bytes_erased.load(Ordering::Relaxed)
    }

    fn phase(&self) -> Phase {
        Phase::from_code(self.phase.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
pub struct ErrorCounters {
    pub pass_errors: u64,
    pub verify_errors: u64,
    pub fsync_errors: u64,
}

/// A point-in-time read of one worker's progress plus its derived
/// throughput/percent/ETA quantities.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub device_path: String,
    pub phase: &'static str,
    pub round_working: u32,
    pub round_total: u32,
    pub pass_working: u32,
    pub pass_total: u32,
    pub percent_round: f64,
    pub throughput_bps: f64,
    pub eta_seconds: f64,
    pub bytes_erased: u64,
    pub errors: ErrorCounters,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalSnapshot {
    pub throughput_bps: f64,
    pub eta_seconds: f64,
}

const THROUGHPUT_EMA_ALPHA: f64 = 0.2;

struct Sample {
    at: Instant,
    bytes: u64,
    ema_bps: f64,
}

/// Derives throughput/ETA from worker-published counters. All sampling
/// state lives here, not on `WorkerProgress`, so workers never touch it;
/// this is the only place that can block (a single observer-local mutex),
/// and only the observer ever locks it.
pub struct StatsObserver {
    samples: Mutex<HashMap<String, Sample>>,
}

impl Default for StatsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsObserver {
    pub fn new() -> Self {
        Self {
            samples: Mutex::new(HashMap::new()),
        }
    }

    pub fn snapshot(&self, progress: &WorkerProgress) -> ProgressSnapshot {
        let bytes_now = progress.bytes_erased();
        let now = Instant::now();

        let ema_bps = {
            let mut samples = self.samples.lock().unwrap();
            let sample = samples
                .entry(progress.device_path.clone())
                .or_insert(Sample { at: now, bytes: bytes_now, ema_bps: 0.0 });

            let dt = now.duration_since(sample.at).as_secs_f64().max(1e-6);
            let instantaneous = bytes_now.saturating_sub(sample.bytes) as f64 / dt;
            sample.ema_bps = if sample.ema_bps == 0.0 {
                instantaneous
            } else {
                THROUGHPUT_EMA_ALPHA * instantaneous + (1.0 - THROUGHPUT_EMA_ALPHA) * sample.ema_bps
            };
            sample.at = now;
            sample.bytes = bytes_now;
            sample.ema_bps
        };

        let round_size = progress.round_size.load(Ordering::Relaxed);
        let bytes_this_round = progress.bytes_this_round.load(Ordering::Relaxed);
        let percent_round = if round_size > 0 {
            (bytes_this_round as f64 / round_size as f64) * 100.0
        } else {
            0.0
        };

        let total_bytes = progress.total_bytes.load(Ordering::Relaxed);
        let remaining = total_bytes.saturating_sub(bytes_now) as f64;
        let eta_seconds = remaining / ema_bps.max(1.0);

        ProgressSnapshot {
            device_path: progress.device_path.clone(),
            phase: progress.phase().label(),
            round_working: progress.round_working.load(Ordering::Relaxed),
            round_total: progress.round_total.load(Ordering::Relaxed),
            pass_working: progress.pass_working.load(Ordering::Relaxed),
            pass_total: progress.pass_total.load(Ordering::Relaxed),
            percent_round,
            throughput_bps: ema_bps,
            eta_seconds,
            bytes_erased: bytes_now,
            errors: ErrorCounters {
                pass_errors: progress.pass_errors.load(Ordering::Relaxed),
                verify_errors: progress.verify_errors.load(Ordering::Relaxed),
                fsync_errors: progress.fsync_errors.load(Ordering::Relaxed),
            },
        }
    }

    /// Global throughput is the sum of per-worker throughputs; global ETA
    /// is the slowest worker's ETA.
    pub fn global(snapshots: &[ProgressSnapshot]) -> GlobalSnapshot {
        GlobalSnapshot {
            throughput_bps: snapshots.iter().map(|s| s.throughput_bps).sum(),
            eta_seconds: snapshots.iter().map(|s| s.eta_seconds).fold(0.0, f64::max),
        }
    }
}
