/// Pass Executor: streams one pattern across a device in aligned
/// chunks, with short-write retry, sync policy, cancellation, and
/// fatal/counted error classification.
use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::cancel::CancellationToken;
use crate::error::{ErrorClass, WipeError, WipeResult};
use crate::io::AlignedBuffer;
use crate::pattern::PatternSource;

/// The block device surface the executor needs. Implemented for
/// `std::fs::File`; tests implement it for an in-memory/loopback-file
/// stand-in.
pub trait BlockDevice: Read + Write + Seek {
    fn datasync(&mut self) -> io::Result<()>;
}

impl BlockDevice for std::fs::File {
    fn datasync(&mut self) -> io::Result<()> {
        nix::unistd::fdatasync(&*self).map_err(io::Error::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    Completed,
    Cancelled,
    /// A fatal error ended the pass early; `bytes_processed` reflects
    /// only what succeeded before it.
    Aborted,
}

/// Outcome of one `run_write`/`run_verify` call. A struct rather than a
/// `Result` because a pass can partially succeed: counted errors (verify
/// mismatches, sync failures) do not stop the pass, so the caller needs
/// both the error tallies and the final disposition together.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub bytes_processed: u64,
    pub pass_errors: u64,
    pub verify_errors: u64,
    pub fsync_errors: u64,
    pub status: PassStatus,
}

impl PassOutcome {
    fn new() -> Self {
        Self {
            bytes_processed: 0,
            pass_errors: 0,
            verify_errors: 0,
            fsync_errors: 0,
            status: PassStatus::Completed,
        }
    }
}

/// Sync cadence: `Every(n)` calls `datasync` after every `n` chunks
/// written; `End` calls it once after the pass completes.
#[derive(Debug, Clone, Copy)]
pub enum SyncPolicy {
    Every(u32),
    End,
}

pub struct PassExecutor {
    chunk_size: usize,
    sync_policy: SyncPolicy,
}

fn is_fatal_errno(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(code) if code == libc::ENOSPC || code == libc::EIO || code == libc::EFAULT
    )
}

impl PassExecutor {
    pub fn new(chunk_size: usize, sync_policy: SyncPolicy) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        Self { chunk_size, sync_policy }
    }

    /// Write `total_bytes` starting at `device`'s current position,
    /// pulling pattern bytes from `source`. `bytes_processed` only ever
    /// advances on bytes actually written.
    pub fn run_write<D: BlockDevice>(
        &self,
        device: &mut D,
        source: &mut PatternSource<'_>,
        total_bytes: u64,
        cancel: &CancellationToken,
    ) -> WipeResult<PassOutcome> {
        let mut outcome = PassOutcome::new();
        let mut buffer = AlignedBuffer::new(self.chunk_size, self.chunk_size);
        let mut chunks_since_sync: u32 = 0;
        let mut offset: u64 = 0;

        while offset < total_bytes {
            if cancel.is_cancelled() {
                outcome.status = PassStatus::Cancelled;
                let _ = device.datasync();
                return Ok(outcome);
            }

            let this_chunk = self.chunk_size.min((total_bytes - offset) as usize);
            let slice = &mut buffer.as_mut_slice()[..this_chunk];
            source.fill(slice);

            match write_with_retry(device, slice, offset) {
                Ok(written) => {
                    outcome.bytes_processed += written as u64;
                    offset += written as u64;
                }
                Err(err) => {
                    outcome.pass_errors += 1;
                    if err.class() == ErrorClass::Fatal {
                        outcome.status = PassStatus::Aborted;
                        return Err(err);
                    }
                    // Counted: skip this chunk and keep going.
                    offset += this_chunk as u64;
                }
            }

            chunks_since_sync += 1;
            if let SyncPolicy::Every(n) = self.sync_policy {
                if n > 0 && chunks_since_sync >= n {
                    chunks_since_sync = 0;
                    if let Err(sync_err) = device.datasync() {
                        outcome.fsync_errors += 1;
                        tracing::warn!(error = %sync_err, "datasync failed mid-pass");
                    }
                }
            }
        }

        // `Every(n)` already synced on the last chunk if it landed exactly
        // on a sync boundary; only sync again here if bytes remain unsynced.
        // `End` never syncs mid-pass, so it always needs this final call.
        let needs_final_sync = match self.sync_policy {
            SyncPolicy::End => true,
            SyncPolicy::Every(_) => chunks_since_sync != 0,
        };
        if needs_final_sync {
            if let Err(sync_err) = device.datasync() {
                outcome.fsync_errors += 1;
                tracing::warn!(error = %sync_err, "final datasync failed");
            }
        }

        Ok(outcome)
    }

    /// Re-read `total_bytes` starting at `device`'s current position and
    /// compare against freshly regenerated pattern bytes from `source`.
    /// Never advances any caller's `bytes_erased` counter — verification
    /// reads, it does not write.
    pub fn run_verify<D: BlockDevice>(
        &self,
        device: &mut D,
        source: &mut PatternSource<'_>,
        total_bytes: u64,
        cancel: &CancellationToken,
    ) -> WipeResult<PassOutcome> {
        let mut outcome = PassOutcome::new();
        let mut expected = AlignedBuffer::new(self.chunk_size, self.chunk_size);
        let mut actual = AlignedBuffer::new(self.chunk_size, self.chunk_size);
        let mut offset: u64 = 0;

        while offset < total_bytes {
            if cancel.is_cancelled() {
                outcome.status = PassStatus::Cancelled;
                return Ok(outcome);
            }

            let this_chunk = self.chunk_size.min((total_bytes - offset) as usize);
            let expected_slice = &mut expected.as_mut_slice()[..this_chunk];
            source.fill(expected_slice);

            let actual_slice = &mut actual.as_mut_slice()[..this_chunk];
            match read_with_retry(device, actual_slice, offset) {
                Ok(()) => {
                    let mismatched = count_mismatches(expected_slice, actual_slice);
                    if mismatched > 0 {
                        outcome.verify_errors += mismatched;
                        tracing::warn!(offset, mismatched, "verify mismatch");
                    } else {
                        outcome.bytes_processed += this_chunk as u64;
                    }
                }
                Err(err) => {
                    outcome.pass_errors += 1;
                    if err.class() == ErrorClass::Fatal {
                        outcome.status = PassStatus::Aborted;
                        return Err(err);
                    }
                }
            }

            offset += this_chunk as u64;
        }

        Ok(outcome)
    }
}

fn count_mismatches(expected: &[u8], actual: &[u8]) -> u64 {
    expected
        .iter()
        .zip(actual.iter())
        .filter(|(e, a)| e != a)
        .count() as u64
}

/// Write `buf` at `offset`, retrying exactly once at the unwritten
/// remainder on a short write. A short write that persists past that one
/// retry is reported as a counted error rather than returned as a partial
/// success, so the caller advances past the whole chunk instead of
/// resuming mid-chunk — the latter would desynchronise a PRNG pass's
/// per-chunk stream boundaries from a later verify pass over the same
/// pattern.
fn write_with_retry<D: BlockDevice>(device: &mut D, buf: &[u8], offset: u64) -> Result<usize, WipeError> {
    device
        .seek(SeekFrom::Start(offset))
        .map_err(|source| classify_io_error(offset, source))?;

    let mut written = 0usize;
    let mut retried = false;
    loop {
        match device.write(&buf[written..]) {
            Ok(0) if written < buf.len() => {
                return Err(WipeError::FatalIOError {
                    offset: offset + written as u64,
                    source: io::Error::new(io::ErrorKind::WriteZero, "write returned 0 bytes"),
                });
            }
            Ok(n) => {
                written += n;
                if written == buf.len() {
                    return Ok(written);
                }
                if retried {
                    return Err(WipeError::TransientIOError {
                        offset: offset + written as u64,
                        source: io::Error::new(
                            io::ErrorKind::WriteZero,
                            format!("persistent short write: {written} of {} bytes written after retry", buf.len()),
                        ),
                    });
                }
                retried = true;
            }
            Err(err) => return Err(classify_io_error(offset + written as u64, err)),
        }
    }
}

fn read_with_retry<D: BlockDevice>(device: &mut D, buf: &mut [u8], offset: u64) -> Result<(), WipeError> {
    device
        .seek(SeekFrom::Start(offset))
        .map_err(|source| classify_io_error(offset, source))?;
    device
        .read_exact(buf)
        .map_err(|source| classify_io_error(offset, source))
}

fn classify_io_error(offset: u64, source: io::Error) -> WipeError {
    if is_fatal_errno(&source) {
        WipeError::FatalIOError { offset, source }
    } else {
        WipeError::TransientIOError { offset, source }
    }
}
