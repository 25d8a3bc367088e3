/// Reusable assertions over a `WorkerReport`, for integration tests that
/// drive a full `Supervisor`/`WipeWorker` run rather than poking the
/// pass executor directly.
use anyhow::Result;
use wipe_engine::{WorkerReport, WorkerResult};

/// Assert the worker finished cleanly: no errors of any kind, and the
/// full device was written.
pub fn assert_clean_success(report: &WorkerReport, device_size: u64, passes: u64) -> Result<()> {
    anyhow::ensure!(
        report.result == WorkerResult::Success,
        "expected a clean success, got {:?}",
        report.result
    );
    anyhow::ensure!(
        report.pass_errors == 0 && report.fsync_errors == 0,
        "expected zero pass/fsync errors, got pass_errors={} fsync_errors={}",
        report.pass_errors,
        report.fsync_errors
    );
    let expected_bytes = device_size * passes;
    anyhow::ensure!(
        report.bytes_written == expected_bytes,
        "expected {} bytes written across {} pass(es), got {}",
        expected_bytes,
        passes,
        report.bytes_written
    );
    Ok(())
}

pub fn assert_no_verify_errors(report: &WorkerReport) -> Result<()> {
    anyhow::ensure!(
        report.verify_errors == 0,
        "expected zero verify errors, got {}",
        report.verify_errors
    );
    Ok(())
}

pub fn print_report(report: &WorkerReport, label: &str) {
    println!("\n=== Worker report: {label} ===");
    println!("  device: {}", report.device_path);
    println!("  bytes_written: {}", report.bytes_written);
    println!(
        "  pass_errors={} verify_errors={} fsync_errors={}",
        report.pass_errors, report.verify_errors, report.fsync_errors
    );
    println!("  result: {:?}", report.result);
    println!("================================\n");
}
